use std::path::PathBuf;

use crate::core::UpgradeError;

/// How a release archive is unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip`, decoded in-process.
    Zip,
    /// `.tar.gz`, handed to the system `tar`.
    TarGz,
}

/// Operating systems spicetify publishes release artifacts for.
///
/// Selected once per run with [`Platform::detect`] and passed around as a
/// value, so every platform-dependent decision (artifact suffix, temp
/// directory, extraction strategy) comes from the same place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows x64, zip archives.
    Windows,
    /// Linux amd64, gzipped tarballs.
    Linux,
    /// macOS amd64, gzipped tarballs.
    Darwin,
}

impl Platform {
    /// The platform this binary is running on.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::UnsupportedPlatform`] when no artifact is published
    /// for the host OS.
    pub fn detect() -> Result<Self, UpgradeError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (as in `std::env::consts::OS`) to a platform.
    ///
    /// ```rust
    /// use spicetify::upgrade::platform::Platform;
    ///
    /// assert_eq!(Platform::from_os("macos").unwrap(), Platform::Darwin);
    /// assert!(Platform::from_os("freebsd").is_err());
    /// ```
    pub fn from_os(os: &str) -> Result<Self, UpgradeError> {
        match os {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::Darwin),
            other => Err(UpgradeError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    /// Suffix appended to `<artifact>-<tag>` in the release asset name.
    pub const fn artifact_suffix(self) -> &'static str {
        match self {
            Self::Windows => "-windows-x64.zip",
            Self::Linux => "-linux-amd64.tar.gz",
            Self::Darwin => "-darwin-amd64.tar.gz",
        }
    }

    /// Extension of the downloaded archive.
    pub const fn archive_extension(self) -> &'static str {
        match self.archive_format() {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }

    /// Extraction strategy for this platform's archives.
    pub const fn archive_format(self) -> ArchiveFormat {
        match self {
            Self::Windows => ArchiveFormat::Zip,
            Self::Linux | Self::Darwin => ArchiveFormat::TarGz,
        }
    }

    /// Directory the archive is downloaded into: `%TEMP%` on Windows,
    /// `/tmp` on Linux, `$TMPDIR` on macOS.
    ///
    /// Falls back to [`std::env::temp_dir`] when the variable is unset.
    pub fn temp_dir(self) -> PathBuf {
        let var = match self {
            Self::Linux => return PathBuf::from("/tmp"),
            Self::Windows => "TEMP",
            Self::Darwin => "TMPDIR",
        };

        std::env::var_os(var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Full URL of the release asset for `tag`.
    ///
    /// ```rust
    /// use spicetify::upgrade::platform::Platform;
    ///
    /// let url = Platform::Linux.artifact_url(
    ///     "https://github.com/khanhas/spicetify-cli/releases/download",
    ///     "spicetify",
    ///     "1.2.3",
    /// );
    /// assert_eq!(
    ///     url,
    ///     "https://github.com/khanhas/spicetify-cli/releases/download/v1.2.3/spicetify-1.2.3-linux-amd64.tar.gz"
    /// );
    /// ```
    pub fn artifact_url(self, releases_base: &str, artifact_name: &str, tag: &str) -> String {
        format!(
            "{}/v{tag}/{artifact_name}-{tag}{}",
            releases_base.trim_end_matches('/'),
            self.artifact_suffix()
        )
    }

    /// File name of the downloaded archive, e.g. `spicetify-1.2.3.tar.gz`.
    pub fn archive_file_name(self, artifact_name: &str, tag: &str) -> String {
        format!("{artifact_name}-{tag}.{}", self.archive_extension())
    }
}
