//! Core types for spicetify
//!
//! ## `error` - Error handling
//!
//! - [`UpgradeError`] - enumerated failure modes of the self-upgrade routine,
//!   split into recoverable (release resolution) and fatal (replacement)
//! - [`ErrorContext`] - user-friendly wrapper with details and suggestions
//! - [`user_friendly_error`] - convert any `anyhow::Error` for display

pub mod error;

pub use error::{
    ErrorContext, PACKAGE_MANAGER_HINT, PERMISSION_HINT, UpgradeError, create_error_context,
    user_friendly_error,
};
