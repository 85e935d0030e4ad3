use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable checked when `github.token` is not configured
pub const TOKEN_FALLBACK_ENV: &str = "GHCP_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub github: GithubConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    pub api_base_url: String,
    pub api_version: String,
    pub token: String,
    pub orgs: Vec<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Base URL of the metrics API the dashboard reads from
    pub url: String,
    pub timeout_seconds: u64,
}

impl ServerConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}

/// Load configuration from defaults, an optional TOML file and the environment
///
/// Environment variables use the `GHCP_STATS` prefix with `__` between
/// sections, e.g. `GHCP_STATS__SERVER__PORT=9000`. `GHCP_STATS__GITHUB__ORGS`
/// takes a comma-separated list.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    load_config_with_env(path, None, std::env::var(TOKEN_FALLBACK_ENV).ok())
}

/// Layer `env_vars` over the file instead of the process environment when given
fn load_config_with_env(
    path: &Path,
    env_vars: Option<config::Map<String, String>>,
    token_fallback: Option<String>,
) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.log_level", "info")?
        .set_default("server.log_format", "text")?
        .set_default("database.path", "metrics.db")?
        .set_default("github.api_base_url", "https://api.github.com")?
        .set_default("github.api_version", "2022-11-28")?
        .set_default("github.token", "")?
        .set_default("github.orgs", Vec::<String>::new())?
        .set_default("github.timeout_seconds", 30)?
        .set_default("dashboard.url", "http://127.0.0.1:8080")?
        .set_default("dashboard.timeout_seconds", 10)?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("GHCP_STATS")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("github.orgs")
                .try_parsing(true)
                .source(env_vars),
        )
        .build()?;

    let mut cfg: Config = config.try_deserialize()?;

    if cfg.github.token.is_empty() {
        if let Some(token) = token_fallback.filter(|token| !token.trim().is_empty()) {
            cfg.github.token = token;
        }
    }

    normalize_orgs(&mut cfg.github.orgs);
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Trim org names and drop blank entries
fn normalize_orgs(orgs: &mut Vec<String>) {
    *orgs = orgs
        .iter()
        .map(|org| org.trim().to_string())
        .filter(|org| !org.is_empty())
        .collect();
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log_format '{}'. Must be one of: text, json", other),
    }

    if cfg.database.path.trim().is_empty() {
        anyhow::bail!("Database path cannot be empty");
    }

    if cfg.github.api_base_url.trim().is_empty() {
        anyhow::bail!("GitHub API base URL cannot be empty");
    }

    if cfg.github.orgs.iter().any(|org| org.trim().is_empty()) {
        anyhow::bail!("Organization names cannot be empty");
    }

    if cfg.github.timeout_seconds == 0 || cfg.dashboard.timeout_seconds == 0 {
        anyhow::bail!("Timeouts must be at least one second");
    }

    if cfg.dashboard.url.trim().is_empty() {
        anyhow::bail!("Dashboard URL cannot be empty");
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        },
        database: DatabaseConfig {
            path: "metrics.db".to_string(),
        },
        github: GithubConfig {
            api_base_url: "https://api.github.com".to_string(),
            api_version: "2022-11-28".to_string(),
            token: "ghp_test_token_1234".to_string(),
            orgs: vec!["acme".to_string()],
            timeout_seconds: 30,
        },
        dashboard: DashboardConfig {
            url: "http://127.0.0.1:8080".to_string(),
            timeout_seconds: 10,
        },
    }
}
