//! Configuration management for spicetify
//!
//! The only persisted settings are the release locations used by the
//! self-upgrade routine, stored in a user-wide TOML file:
//!
//! - Unix/macOS: `~/.spicetify/upgrade.toml`
//! - Windows: `%LOCALAPPDATA%\spicetify\upgrade.toml`
//!
//! ```toml
//! [upgrade]
//! repository = "khanhas/spicetify-cli"
//! ```
//!
//! Every field is optional; see [`crate::upgrade::config::UpgradeConfig`] for
//! defaults.

mod global;

pub use global::GlobalConfig;
