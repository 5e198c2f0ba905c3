//! Progress indicators for long-running transfers.
//!
//! Bars are hidden after [`disable_progress`] (the global `--no-progress`
//! flag calls it), when `SPICETIFY_NO_PROGRESS` holds a true value such as
//! `1`, or when stdout is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable that disables all progress bars.
pub const NO_PROGRESS_ENV: &str = "SPICETIFY_NO_PROGRESS";

static PROGRESS_DISABLED: AtomicBool = AtomicBool::new(false);

/// Hide every progress bar created from now on.
pub fn disable_progress() {
    PROGRESS_DISABLED.store(true, Ordering::Relaxed);
}

/// Whether progress bars should be suppressed.
pub fn is_progress_disabled() -> bool {
    PROGRESS_DISABLED.load(Ordering::Relaxed)
        || std::env::var(NO_PROGRESS_ENV).is_ok_and(|value| is_truthy(&value))
        || !std::io::stdout().is_terminal()
}

/// Reads a flag value the way the CLI does: empty, `0`, `false`, `no` and
/// `off` (any case) mean unset.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || ["0", "false", "no", "off", "n", "f"]
            .iter()
            .any(|falsey| value.eq_ignore_ascii_case(falsey)))
}

/// A byte-count bar for a download of `total` bytes, or a spinner when the
/// size is unknown.
pub fn download_bar(total: Option<u64>) -> ProgressBar {
    if is_progress_disabled() {
        return ProgressBar::hidden();
    }

    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(download_style());
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar
        }
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸━")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("  {spinner:.cyan} {bytes}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
