//! Command-line interface for spicetify.
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Only log errors
//! - `--no-progress` - Disable the download progress bar
//! - `--config` - Path to a custom `upgrade.toml`
//!
//! Logs go to stderr; command output goes to stdout.
//!
//! # Example
//!
//! ```bash
//! # Replace the installed binary with the latest release
//! spicetify upgrade
//!
//! # Only report whether a newer release exists
//! spicetify upgrade --check
//!
//! # Upgrade from a mirror without a progress bar
//! spicetify --config ./mirror.toml --no-progress upgrade
//! ```

mod upgrade;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::utils::progress::{NO_PROGRESS_ENV, disable_progress};

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can build and inspect it without
/// parsing arguments or touching global state.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit log filter. `None` falls back to `RUST_LOG`, then `warn`.
    pub log_level: Option<String>,

    /// Hide the download progress bar.
    pub no_progress: bool,

    /// Custom path to the configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Configuration with logging from `RUST_LOG` and progress enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    #[must_use]
    pub fn with_no_progress(mut self, no_progress: bool) -> Self {
        self.no_progress = no_progress;
        self
    }

    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Log filter to install: the explicit level, else `RUST_LOG`, else `warn`.
    pub fn env_filter(&self) -> EnvFilter {
        match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        }
    }

    /// Install the tracing subscriber and apply the progress setting.
    ///
    /// A subscriber that is already installed is left in place.
    pub fn apply(&self) {
        if self.no_progress {
            disable_progress();
        }

        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser)]
#[command(
    name = "spicetify",
    about = "Spotify client customization tool",
    version,
    long_about = "spicetify customizes the Spotify desktop client. The `upgrade` command replaces this binary with the latest published release."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ~/.spicetify/upgrade.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable the download progress bar
    #[arg(
        long,
        global = true,
        env = NO_PROGRESS_ENV,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace this binary with the latest release
    Upgrade(upgrade::UpgradeArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply();

        match self.command {
            Commands::Upgrade(args) => upgrade::execute(args, config.config_path).await,
        }
    }
}
