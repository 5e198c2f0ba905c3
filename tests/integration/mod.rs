//! Integration test suite for spicetify
//!
//! Runs the upgrade routine and the `spicetify` binary against a `wiremock`
//! server standing in for the GitHub release API and artifact host.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **upgrade**: the resolve, download, and replace sequence through the library API
//! - **cli**: the compiled binary's output and exit codes

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod upgrade;
