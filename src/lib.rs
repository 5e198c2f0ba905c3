//! spicetify - Spotify client customization tool
//!
//! This crate carries the self-upgrade routine of the `spicetify` binary:
//! resolve the latest GitHub release, compare it with the running version,
//! and swap the executable in place.
//!
//! # Architecture
//!
//! - [`upgrade`] - release resolution and executable replacement
//! - [`config`] - `upgrade.toml` loading (release source overrides)
//! - [`core`] - error types and user-facing error display
//! - [`cli`] - command-line parsing and output
//! - [`utils`] - progress bars
//!
//! # Example
//!
//! ```rust,no_run
//! use spicetify::config::GlobalConfig;
//! use spicetify::upgrade::{SilentProgress, Upgrader};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load().await?;
//! let upgrader = Upgrader::new(config.upgrade, "2.9.8")?;
//! let latest = upgrader.fetch_latest().await?;
//! if latest != upgrader.current_version() {
//!     upgrader.replace(&latest, &SilentProgress).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod upgrade;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
