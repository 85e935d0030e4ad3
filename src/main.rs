use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use ghcp_stats::{config, init_file_tracing, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    if let cli::Commands::Version = command {
        println!("ghcp-stats v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = config::load_config(&args.config)?;

    // The dashboard owns the terminal, so its logs go to a file
    let _log_guard = match &command {
        cli::Commands::Dashboard { log_file, .. } => {
            Some(init_file_tracing(&cfg.server.log_level, log_file))
        }
        _ => {
            init_tracing(&cfg.server.log_level, cfg.server.json_logs());
            None
        }
    };

    // Dispatch to appropriate command handler
    match command {
        cli::Commands::Serve => commands::serve::execute(cfg).await?,
        cli::Commands::Import => commands::import::execute(cfg).await?,
        cli::Commands::Dashboard { url, .. } => commands::dashboard::execute(cfg, url).await?,
        cli::Commands::Show { url } => commands::show::execute(cfg, url).await?,
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
            cli::ConfigCommands::Validate => commands::config::validate(&cfg)?,
        },
        // Printed before configuration loading
        cli::Commands::Version => {}
    }

    Ok(())
}
