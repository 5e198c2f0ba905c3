//! Terminal helpers shared by the CLI and the upgrade routine.
//!
//! - [`progress`] - download progress bars

pub mod progress;
