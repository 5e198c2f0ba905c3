//! Error handling for spicetify
//!
//! The upgrade routine reports failures through two layers:
//! 1. [`UpgradeError`] - a strongly-typed enumeration of everything that can go
//!    wrong while resolving, downloading, and swapping the executable
//! 2. [`ErrorContext`] - a wrapper that adds details and an actionable
//!    suggestion for display on the terminal
//!
//! # Recoverable vs fatal
//!
//! Errors raised while resolving the latest release happen before any file is
//! touched. They are *recoverable*: the command prints them and returns
//! normally. Every other variant is *fatal*: the binary prints a diagnostic
//! and exits with a non-zero status. Only `main` terminates the process; the
//! library always returns.
//!
//! ```rust,no_run
//! use spicetify::core::{UpgradeError, user_friendly_error};
//!
//! let err = UpgradeError::EmptyTag;
//! assert!(err.is_recoverable());
//!
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Shown after failures inside the executable's directory.
pub const PERMISSION_HINT: &str = "If fatal error is \"Permission denied\", please check read/write permission of spicetify executable directory.";

/// Shown alongside [`PERMISSION_HINT`].
pub const PACKAGE_MANAGER_HINT: &str = "If you used a package manager to install spicetify, please upgrade by using the same package manager.";

/// Every failure the self-upgrade routine can produce.
///
/// Variants are grouped by the step that raises them. Use
/// [`is_recoverable`](Self::is_recoverable) to decide whether the process
/// should terminate.
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// The release metadata request could not be sent or its body could not
    /// be read.
    #[error("Cannot fetch latest release info from {url}")]
    ReleaseRequest {
        /// Release metadata endpoint
        url: String,
        /// Underlying HTTP failure
        #[source]
        source: reqwest::Error,
    },

    /// The release metadata endpoint answered with a non-success status.
    #[error("Cannot fetch latest release info: {url} returned HTTP {status}")]
    ReleaseStatus {
        /// Release metadata endpoint
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The release metadata body was not a record with a `tag_name` string.
    #[error("Cannot fetch latest release info: response is not a release record")]
    ReleaseDecode(#[source] serde_json::Error),

    /// The release record carried an empty tag (or only the prefix character).
    #[error("Cannot fetch latest release info: release has an empty tag name")]
    EmptyTag,

    /// The HTTP client could not be constructed.
    #[error("Failed to initialize HTTP client")]
    HttpClient(#[source] reqwest::Error),

    /// The host operating system has no published artifact.
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform {
        /// Value of `std::env::consts::OS`
        os: String,
    },

    /// The temporary archive file could not be created.
    #[error("Failed to create download file {path}")]
    TempFile {
        /// Archive path inside the temp directory
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The artifact request failed or its body stream broke.
    #[error("Failed to download {url}")]
    Download {
        /// Artifact URL
        url: String,
        /// Underlying HTTP failure
        #[source]
        source: reqwest::Error,
    },

    /// The artifact endpoint answered with a non-success status.
    #[error("Download of {url} failed with HTTP {status}")]
    DownloadStatus {
        /// Artifact URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Writing the artifact body to disk failed.
    #[error("Failed to write download to {path}")]
    DownloadWrite {
        /// Archive path inside the temp directory
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// A `.old` file left by a previous run could not be removed.
    #[error("Failed to remove stale backup {path}")]
    StaleBackup {
        /// Backup path next to the executable
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The running executable's path could not be determined or resolved.
    #[error("Failed to locate current executable")]
    LocateExecutable(#[source] io::Error),

    /// The current executable could not be renamed to its backup path.
    #[error("Failed to move {from} to {to}")]
    Rename {
        /// Executable being moved
        from: PathBuf,
        /// Backup destination
        to: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The archive could not be unpacked into the executable's directory.
    #[error("Failed to extract {archive} into {dest}")]
    Extract {
        /// Downloaded archive
        archive: PathBuf,
        /// Executable directory
        dest: PathBuf,
        /// Backup holding the previous binary
        backup: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },
}

impl UpgradeError {
    /// Resolver failures leave the installation untouched, so the caller may
    /// report them and carry on.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ReleaseRequest { .. }
                | Self::ReleaseStatus { .. }
                | Self::ReleaseDecode(_)
                | Self::EmptyTag
        )
    }

    /// Whether the failure touched the executable's directory and deserves the
    /// permission / package-manager hint.
    #[must_use]
    pub const fn needs_permission_hint(&self) -> bool {
        matches!(
            self,
            Self::StaleBackup { .. } | Self::Rename { .. } | Self::Extract { .. }
        )
    }
}

/// An error with optional details and a suggestion, ready for display.
///
/// ```rust,no_run
/// use spicetify::core::{ErrorContext, UpgradeError};
///
/// let ctx = ErrorContext::new(UpgradeError::EmptyTag)
///     .with_details("The latest GitHub release has no tag")
///     .with_suggestion("Try again later");
/// ctx.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The headline error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context from anything printable, without details or suggestion.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            message: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the context to stderr: error in red, details in yellow,
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Build the display context for a typed upgrade failure.
#[must_use]
pub fn create_error_context(error: &UpgradeError) -> ErrorContext {
    let ctx = ErrorContext::new(format_chain(error));

    match error {
        UpgradeError::StaleBackup { .. } | UpgradeError::Rename { .. } => ctx
            .with_details(PERMISSION_HINT)
            .with_suggestion(PACKAGE_MANAGER_HINT),
        UpgradeError::Extract { backup, .. } => ctx
            .with_details(format!(
                "{PERMISSION_HINT}\nThe previous binary is preserved at {}",
                backup.display()
            ))
            .with_suggestion(PACKAGE_MANAGER_HINT),
        UpgradeError::UnsupportedPlatform { .. } => ctx
            .with_details("Release artifacts are published for Windows, Linux and macOS only")
            .with_suggestion("Build spicetify from source for this platform"),
        UpgradeError::ReleaseStatus { status: 403, .. } => ctx
            .with_details("GitHub may be rate limiting unauthenticated API requests")
            .with_suggestion("Wait a while and run the upgrade again"),
        UpgradeError::DownloadStatus { status: 404, .. } => ctx
            .with_details("The release does not contain an artifact for this platform")
            .with_suggestion("Download the release manually from GitHub"),
        UpgradeError::TempFile { .. } | UpgradeError::DownloadWrite { .. } => {
            ctx.with_suggestion("Check free space and permissions of the temporary directory")
        }
        _ => ctx,
    }
}

/// Convert any error into a user-facing [`ErrorContext`].
///
/// Typed [`UpgradeError`]s get tailored hints, bare I/O errors get generic
/// filesystem guidance, everything else is shown with its context chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(upgrade_error) = error.downcast_ref::<UpgradeError>() {
        return create_error_context(upgrade_error);
    }

    if let Some(io_error) = error.downcast_ref::<io::Error>() {
        let ctx = ErrorContext::new(format!("{error:#}"));
        return match io_error.kind() {
            io::ErrorKind::PermissionDenied => ctx.with_suggestion(
                "Try running with elevated permissions (sudo/Administrator) or check file ownership",
            ),
            io::ErrorKind::NotFound => {
                ctx.with_suggestion("Check that the file or directory exists and the path is correct")
            }
            _ => ctx,
        };
    }

    ErrorContext::new(format!("{error:#}"))
}

/// Render an error followed by its `source()` chain, `a: b: c`.
fn format_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
