//! Archive extraction strategies.
//!
//! Windows releases are zip files decoded in-process with the `zip` crate.
//! POSIX releases are gzipped tarballs handed to the system `tar`, the same
//! way the release archives are produced. Both sit behind
//! [`ArchiveExtractor`] so the replacement protocol can be exercised with a
//! fake in tests.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::platform::ArchiveFormat;

/// Unpacks a downloaded release archive into a directory.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract every entry of `archive` into `dest`, overwriting existing
    /// files.
    fn extract(&self, archive: &Path, dest: &Path) -> impl Future<Output = io::Result<()>> + Send;
}

/// Linked zip decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> io::Result<()> {
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();

        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let file = std::fs::File::open(&archive)?;
            let mut zip = zip::ZipArchive::new(file)?;
            zip.extract(&dest)?;
            Ok(())
        })
        .await
        .map_err(io::Error::other)?
    }
}

/// Runs `tar -xzf <archive> -C <dest>` as a child process.
#[derive(Debug, Clone)]
pub struct TarCommandExtractor {
    program: PathBuf,
}

impl Default for TarCommandExtractor {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tar"),
        }
    }
}

impl TarCommandExtractor {
    /// Use a specific `tar` executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to `tar`.
    pub fn args(archive: &Path, dest: &Path) -> Vec<std::ffi::OsString> {
        vec![
            "-xzf".into(),
            archive.as_os_str().to_owned(),
            "-C".into(),
            dest.as_os_str().to_owned(),
        ]
    }
}

impl ArchiveExtractor for TarCommandExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> io::Result<()> {
        let args = Self::args(archive, dest);
        debug!("Running {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(io::Error::other(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// Picks the strategy matching the platform's archive format.
#[derive(Debug, Clone)]
pub struct SystemExtractor {
    format: ArchiveFormat,
    zip: ZipExtractor,
    tar: TarCommandExtractor,
}

impl SystemExtractor {
    /// Extractor for archives of `format`.
    pub fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            zip: ZipExtractor,
            tar: TarCommandExtractor::default(),
        }
    }

    /// The archive format this extractor handles.
    pub const fn format(&self) -> ArchiveFormat {
        self.format
    }
}

impl ArchiveExtractor for SystemExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> io::Result<()> {
        match self.format {
            ArchiveFormat::Zip => self.zip.extract(archive, dest).await,
            ArchiveFormat::TarGz => self.tar.extract(archive, dest).await,
        }
    }
}
