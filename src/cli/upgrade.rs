//! `spicetify upgrade`: replace the running binary with the latest release.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::cell::Cell;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::config::GlobalConfig;
use crate::core::{UpgradeError, create_error_context};
use crate::upgrade::release::is_up_to_date;
use crate::upgrade::{UpgradeOutcome, UpgradeProgress, Upgrader};

/// Command to upgrade spicetify to the latest release.
///
/// # Examples
///
/// ```bash
/// # Upgrade to the latest release
/// spicetify upgrade
///
/// # Check whether an upgrade is available without installing it
/// spicetify upgrade --check
/// ```
///
/// The previous binary is renamed to `<exe>.old` before the new one is
/// extracted, and removed once extraction succeeds. If extraction fails the
/// `.old` file is kept so it can be restored by hand.
#[derive(Parser, Debug)]
pub struct UpgradeArgs {
    /// Check for a newer release without installing it
    #[arg(long)]
    pub check: bool,
}

/// Step reporter writing the `Label: OK` lines to stdout.
#[derive(Default)]
struct ConsoleProgress {
    open_step: Cell<bool>,
}

impl ConsoleProgress {
    /// End a step line left open by a failure.
    fn interrupt(&self) {
        if self.open_step.replace(false) {
            println!();
        }
    }
}

impl UpgradeProgress for ConsoleProgress {
    fn step(&self, label: &str) {
        self.interrupt();
        print!("{} ", format!("{label}:").bold());
        let _ = std::io::stdout().flush();
        self.open_step.set(true);
    }

    fn ok(&self) {
        self.open_step.set(false);
        println!("{}", "OK".green());
    }

    fn info(&self, message: &str) {
        self.interrupt();
        println!("{message}");
    }
}

/// Execute the upgrade command.
///
/// Failing to resolve the latest release is reported and treated as a
/// successful run. Any later failure is returned so the caller exits
/// non-zero.
pub async fn execute(args: UpgradeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = GlobalConfig::load_with_optional(config_path)
        .await
        .context("Failed to load upgrade configuration")?;
    debug!("Fetching releases from {}", config.upgrade.latest_release_url());

    let upgrader = Upgrader::new(config.upgrade, env!("CARGO_PKG_VERSION"))?;
    let progress = ConsoleProgress::default();

    let result = if args.check {
        check_for_updates(&upgrader, &progress).await
    } else {
        upgrader.run(&progress).await.map(|outcome| report(&outcome))
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_recoverable() => {
            progress.interrupt();
            create_error_context(&e).display();
            Ok(())
        }
        Err(e) => {
            progress.interrupt();
            Err(e.into())
        }
    }
}

fn report(outcome: &UpgradeOutcome) {
    match outcome {
        UpgradeOutcome::UpToDate { .. } => println!("{}", "Already up-to-date.".green()),
        UpgradeOutcome::Upgraded { .. } => println!("{}", "spicetify is up-to-date.".green()),
    }
}

async fn check_for_updates(
    upgrader: &Upgrader,
    progress: &ConsoleProgress,
) -> Result<(), UpgradeError> {
    progress.step(crate::upgrade::steps::FETCH);
    let latest = upgrader.fetch_latest().await?;
    progress.ok();

    let current = upgrader.current_version();
    progress.info(&format!("Current version: {current}"));
    progress.info(&format!("Latest release: {latest}"));

    if is_up_to_date(current, &latest) {
        println!("{}", "Already up-to-date.".green());
    } else {
        println!("{}", format!("Update available: {current} -> {latest}").yellow());
        println!("Run `spicetify upgrade` to install it");
    }

    Ok(())
}
