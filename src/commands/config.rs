use anyhow::Result;
use colored::Colorize;
use ghcp_stats::{config::Config, logging::mask_secret};
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration with the GitHub token masked
pub fn show(cfg: &Config) -> Result<()> {
    info!("Displaying configuration");

    let sanitized = sanitize_secrets(cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
///
/// Loading already validated the configuration; print a summary
pub fn validate(cfg: &Config) -> Result<()> {
    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Database: {}", cfg.database.path);
    println!("  Organizations: {}", cfg.github.orgs.len());
    println!("  GitHub token: {}", mask_secret(&cfg.github.token));
    println!("  Dashboard backend: {}", cfg.dashboard.url);

    if cfg.github.token.is_empty() {
        println!(
            "{}",
            "  Warning: no GitHub token; imports will fail".yellow()
        );
    }

    info!("Configuration validation successful");
    Ok(())
}

/// Mask secrets in configuration for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.github.token = mask_secret(&cfg.github.token);
    sanitized
}
