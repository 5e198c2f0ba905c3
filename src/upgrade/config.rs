use serde::Deserialize;

/// Where the self-upgrade routine looks for releases.
///
/// The defaults point at the official spicetify repository on GitHub. They
/// only need overriding to use a mirror or, in tests, a local mock server.
///
/// # TOML Example
/// ```toml
/// [upgrade]
/// repository = "khanhas/spicetify-cli"
/// api_base = "https://api.github.com"
/// download_base = "https://github.com"
/// artifact_name = "spicetify"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpgradeConfig {
    /// GitHub `owner/name` of the repository publishing releases.
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Base URL of the release metadata API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Base URL release artifacts are downloaded from.
    #[serde(default = "default_download_base")]
    pub download_base: String,

    /// Name prefix of release artifacts, e.g. `spicetify` in
    /// `spicetify-1.2.3-linux-amd64.tar.gz`.
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            api_base: default_api_base(),
            download_base: default_download_base(),
            artifact_name: default_artifact_name(),
        }
    }
}

fn default_repository() -> String {
    "khanhas/spicetify-cli".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_download_base() -> String {
    "https://github.com".to_string()
}

fn default_artifact_name() -> String {
    "spicetify".to_string()
}

impl UpgradeConfig {
    /// Release metadata endpoint for the latest release.
    ///
    /// ```rust
    /// use spicetify::upgrade::config::UpgradeConfig;
    ///
    /// assert_eq!(
    ///     UpgradeConfig::default().latest_release_url(),
    ///     "https://api.github.com/repos/khanhas/spicetify-cli/releases/latest"
    /// );
    /// ```
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.repository
        )
    }

    /// Base URL that tagged release artifacts live under.
    pub fn releases_base(&self) -> String {
        format!(
            "{}/{}/releases/download",
            self.download_base.trim_end_matches('/'),
            self.repository
        )
    }
}
