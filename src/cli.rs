use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ghcp-stats", version, about = "GitHub Copilot metrics dashboard")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the metrics API server (default)
    Serve,

    /// Import Copilot metrics from GitHub for the configured organizations
    Import,

    /// Open the interactive metrics dashboard
    Dashboard {
        /// Backend base URL (taken from config if not provided)
        #[arg(short, long)]
        url: Option<String>,

        /// File the dashboard writes its logs to
        #[arg(long, default_value = "ghcp-stats-dashboard.log")]
        log_file: PathBuf,
    },

    /// Fetch the metrics once and print them
    Show {
        /// Backend base URL (taken from config if not provided)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
