use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::download::discard;
use super::extract::ArchiveExtractor;
use super::{UpgradeProgress, steps};
use crate::core::UpgradeError;

/// Suffix of the renamed-aside previous binary.
pub const BACKUP_SUFFIX: &str = ".old";

/// Swaps the executable at `current_path` for the contents of a downloaded
/// archive.
///
/// The sequence is: remove a stale `<exe>.old`, rename `<exe>` to
/// `<exe>.old`, extract the archive into the executable's directory, then
/// delete `<exe>.old`. The rename is the only step that moves the previous
/// binary, and it is a single filesystem operation, so at every point either
/// `current_path` or `backup_path` holds a working binary.
///
/// Renaming works even while the binary is running: POSIX keeps the inode
/// alive and Windows permits renaming (but not deleting) a mapped image.
#[derive(Debug, Clone)]
pub struct ExecutableReplacement {
    current_path: PathBuf,
    backup_path: PathBuf,
    archive_path: PathBuf,
}

impl ExecutableReplacement {
    /// Replacement of `current_path` by the archive at `archive_path`.
    pub fn new(current_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        let current_path = current_path.into();
        Self {
            backup_path: backup_path_for(&current_path),
            current_path,
            archive_path: archive_path.into(),
        }
    }

    /// Replacement targeting the running executable, resolved through
    /// symlinks.
    pub async fn for_running_executable(
        archive_path: impl Into<PathBuf>,
    ) -> Result<Self, UpgradeError> {
        let current = locate_current_executable().await?;
        Ok(Self::new(current, archive_path))
    }

    /// The executable being replaced.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Where the previous binary is parked during the swap.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// The downloaded archive.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Directory the archive is unpacked into.
    pub fn install_dir(&self) -> &Path {
        self.current_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Rename the current executable to the backup path, removing a stale
    /// backup from an earlier run first.
    ///
    /// On failure nothing has been moved: the rename either happened
    /// completely or not at all.
    pub async fn move_aside(&self) -> Result<(), UpgradeError> {
        if remove_if_exists(&self.backup_path).await.map_err(|source| {
            UpgradeError::StaleBackup {
                path: self.backup_path.clone(),
                source,
            }
        })? {
            debug!("Removed stale backup {}", self.backup_path.display());
        }

        fs::rename(&self.current_path, &self.backup_path)
            .await
            .map_err(|source| UpgradeError::Rename {
                from: self.current_path.clone(),
                to: self.backup_path.clone(),
                source,
            })?;

        info!(
            "Moved {} to {}",
            self.current_path.display(),
            self.backup_path.display()
        );
        Ok(())
    }

    /// Unpack the archive into the executable's directory and check that it
    /// recreated the executable.
    ///
    /// On failure the backup is left in place so the previous binary can be
    /// restored by hand.
    pub async fn extract_with<E: ArchiveExtractor>(&self, extractor: &E) -> Result<(), UpgradeError> {
        let dest = self.install_dir();
        let extract_err = |source| UpgradeError::Extract {
            archive: self.archive_path.clone(),
            dest: dest.to_path_buf(),
            backup: self.backup_path.clone(),
            source,
        };

        extractor.extract(&self.archive_path, dest).await.map_err(extract_err)?;

        match fs::try_exists(&self.current_path).await {
            Ok(true) => {
                info!("Extracted new binary to {}", self.current_path.display());
                Ok(())
            }
            Ok(false) => Err(extract_err(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "archive did not contain {}",
                    self.current_path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default()
                ),
            ))),
            Err(source) => Err(extract_err(source)),
        }
    }

    /// Delete the backup and the downloaded archive.
    ///
    /// Best effort: failures are logged, never returned. On Windows the
    /// backup is the image of the running process and cannot be deleted
    /// until it exits; the next upgrade removes it as a stale backup.
    ///
    /// Returns whether the backup is gone.
    pub async fn cleanup(&self) -> bool {
        let backup_removed = match remove_if_exists(&self.backup_path).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Could not remove {}: {}", self.backup_path.display(), e);
                false
            }
        };

        discard(&self.archive_path).await;

        backup_removed
    }

    /// Run the whole swap: [`move_aside`](Self::move_aside),
    /// [`extract_with`](Self::extract_with), [`cleanup`](Self::cleanup),
    /// reporting the extraction step to `progress`.
    ///
    /// If the executable cannot be moved aside, the archive is removed and
    /// nothing else changes. If extraction fails, both the archive and the
    /// backup are kept.
    pub async fn apply<E: ArchiveExtractor>(
        &self,
        extractor: &E,
        progress: &impl UpgradeProgress,
    ) -> Result<(), UpgradeError> {
        if let Err(e) = self.move_aside().await {
            discard(&self.archive_path).await;
            return Err(e);
        }

        progress.step(steps::EXTRACT);
        self.extract_with(extractor).await?;
        self.cleanup().await;
        progress.ok();
        Ok(())
    }
}

/// Path of the running executable with symlinks resolved.
pub async fn locate_current_executable() -> Result<PathBuf, UpgradeError> {
    let exe = std::env::current_exe().map_err(UpgradeError::LocateExecutable)?;
    let resolved = fs::canonicalize(&exe).await.map_err(UpgradeError::LocateExecutable)?;
    debug!("Current executable: {}", resolved.display());
    Ok(resolved)
}

/// `<path>.old`, keeping any existing extension (`spicetify.exe.old`).
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut backup = OsString::from(path.as_os_str());
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

/// Remove a file, treating "already gone" as success. Returns whether a
/// file was removed.
async fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
