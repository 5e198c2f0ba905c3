//! Self-update functionality for spicetify.
//!
//! `spicetify upgrade` replaces the running binary with the latest GitHub
//! release. The routine is a straight line with early exits:
//!
//! ```text
//! 1. Resolve     GET <api>/repos/<repo>/releases/latest -> tag_name "v1.2.3" -> "1.2.3"
//! 2. Compare     current == latest ? "Already up-to-date." : continue
//! 3. Download    <releases>/v1.2.3/spicetify-1.2.3-<platform suffix> -> temp file
//! 4. Locate      current_exe(), symlinks resolved
//! 5. Move aside  remove stale <exe>.old, rename <exe> -> <exe>.old
//! 6. Extract     unpack archive into the executable's directory
//! 7. Clean up    delete <exe>.old and the archive (best effort)
//! ```
//!
//! Failures in step 1 are recoverable ([`UpgradeError::is_recoverable`]);
//! anything later is fatal and the caller is expected to exit non-zero.
//! At every point either `<exe>` or `<exe>.old` holds a working binary.
//!
//! # Module Structure
//!
//! - [`release`]: release metadata lookup and version comparison
//! - [`platform`]: per-OS artifact names, temp directories, archive formats
//! - [`download`]: streaming the artifact into the temp file
//! - [`extract`]: zip / tar extraction strategies
//! - [`replace`]: the rename / extract / cleanup transaction
//! - [`config`]: where releases are fetched from
//!
//! ```rust,no_run
//! use spicetify::upgrade::{SilentProgress, Upgrader, UpgradeOutcome};
//! use spicetify::upgrade::config::UpgradeConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let upgrader = Upgrader::new(UpgradeConfig::default(), env!("CARGO_PKG_VERSION"))?;
//! match upgrader.run(&SilentProgress).await? {
//!     UpgradeOutcome::UpToDate { version } => println!("Already on {version}"),
//!     UpgradeOutcome::Upgraded { from, to } => println!("{from} -> {to}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod download;
pub mod extract;
pub mod platform;
pub mod release;
pub mod replace;

use std::path::PathBuf;
use tracing::info;

use crate::core::UpgradeError;
use config::UpgradeConfig;
use extract::{ArchiveExtractor, SystemExtractor};
use platform::Platform;
use release::{ReleaseResolver, is_up_to_date};
use replace::ExecutableReplacement;

/// Labels of the reported steps.
pub mod steps {
    /// Release metadata lookup.
    pub const FETCH: &str = "Fetch latest release info";
    /// Artifact download.
    pub const DOWNLOAD: &str = "Downloading";
    /// Archive extraction over the executable.
    pub const EXTRACT: &str = "Extracting";
}

/// Receives progress reports from [`Upgrader::run`].
///
/// Reporting never affects control flow.
pub trait UpgradeProgress {
    /// A labelled step has started.
    fn step(&self, label: &str);
    /// The most recent step finished successfully.
    fn ok(&self);
    /// Informational line, e.g. the current and latest versions.
    fn info(&self, message: &str);
}

/// Discards all progress reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl UpgradeProgress for SilentProgress {
    fn step(&self, _label: &str) {}
    fn ok(&self) {}
    fn info(&self, _message: &str) {}
}

/// Result of a completed upgrade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The running version already equals the latest release.
    UpToDate {
        /// The shared version string
        version: String,
    },
    /// The executable was replaced.
    Upgraded {
        /// Version that was running
        from: String,
        /// Version now installed
        to: String,
    },
}

/// Drives the resolve → compare → replace sequence.
///
/// The extractor is a type parameter so tests can swap the archive tooling
/// for a fake; production code uses [`SystemExtractor`].
pub struct Upgrader<E = SystemExtractor> {
    client: reqwest::Client,
    config: UpgradeConfig,
    platform: Platform,
    current_version: String,
    executable: Option<PathBuf>,
    download_dir: Option<PathBuf>,
    extractor: E,
}

impl Upgrader<SystemExtractor> {
    /// Upgrader for the host platform.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::UnsupportedPlatform`] on an OS without release
    /// artifacts, [`UpgradeError::HttpClient`] if the HTTP client cannot be
    /// built.
    pub fn new(
        config: UpgradeConfig,
        current_version: impl Into<String>,
    ) -> Result<Self, UpgradeError> {
        Self::for_platform(config, current_version, Platform::detect()?)
    }

    /// Upgrader for an explicit platform.
    pub fn for_platform(
        config: UpgradeConfig,
        current_version: impl Into<String>,
        platform: Platform,
    ) -> Result<Self, UpgradeError> {
        let current_version = current_version.into();
        let client = reqwest::Client::builder()
            .user_agent(format!("spicetify/{current_version}"))
            .build()
            .map_err(UpgradeError::HttpClient)?;

        Ok(Self {
            client,
            config,
            platform,
            current_version,
            executable: None,
            download_dir: None,
            extractor: SystemExtractor::new(platform.archive_format()),
        })
    }
}

impl<E: ArchiveExtractor> Upgrader<E> {
    /// Replace the archive extraction strategy.
    pub fn with_extractor<F: ArchiveExtractor>(self, extractor: F) -> Upgrader<F> {
        Upgrader {
            client: self.client,
            config: self.config,
            platform: self.platform,
            current_version: self.current_version,
            executable: self.executable,
            download_dir: self.download_dir,
            extractor,
        }
    }

    /// Replace `path` instead of the running executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Download into `dir` instead of the platform temp directory.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Version of the running binary.
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Platform the artifact is selected for.
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Latest published version, without the `v` prefix.
    pub async fn fetch_latest(&self) -> Result<String, UpgradeError> {
        ReleaseResolver::new(self.client.clone(), self.config.latest_release_url())
            .fetch_latest_tag()
            .await
    }

    /// Artifact URL for `tag` on this platform.
    pub fn artifact_url(&self, tag: &str) -> String {
        self.platform
            .artifact_url(&self.config.releases_base(), &self.config.artifact_name, tag)
    }

    /// Temp path the archive for `tag` is downloaded to.
    pub fn archive_path(&self, tag: &str) -> PathBuf {
        let dir = self
            .download_dir
            .clone()
            .unwrap_or_else(|| self.platform.temp_dir());
        dir.join(self.platform.archive_file_name(&self.config.artifact_name, tag))
    }

    /// Resolve the latest release and install it unless already running it.
    pub async fn run(&self, progress: &impl UpgradeProgress) -> Result<UpgradeOutcome, UpgradeError> {
        progress.step(steps::FETCH);
        let latest = self.fetch_latest().await?;
        progress.ok();

        progress.info(&format!("Current version: {}", self.current_version));
        progress.info(&format!("Latest release: {latest}"));

        if is_up_to_date(&self.current_version, &latest) {
            info!("Already on latest version {}", latest);
            return Ok(UpgradeOutcome::UpToDate { version: latest });
        }

        self.replace(&latest, progress).await?;

        Ok(UpgradeOutcome::Upgraded {
            from: self.current_version.clone(),
            to: latest,
        })
    }

    /// Download the release `tag` and swap it in for the executable.
    pub async fn replace(&self, tag: &str, progress: &impl UpgradeProgress) -> Result<(), UpgradeError> {
        let url = self.artifact_url(tag);
        let archive = self.archive_path(tag);

        progress.step(steps::DOWNLOAD);
        download::download_to_file(&self.client, &url, &archive).await?;
        progress.ok();

        let replacement = match &self.executable {
            Some(path) => ExecutableReplacement::new(path, &archive),
            None => match ExecutableReplacement::for_running_executable(&archive).await {
                Ok(replacement) => replacement,
                Err(e) => {
                    download::discard(&archive).await;
                    return Err(e);
                }
            },
        };

        replacement.apply(&self.extractor, progress).await?;

        info!("Upgraded {} to {}", self.current_version, tag);
        Ok(())
    }
}
