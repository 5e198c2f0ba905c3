use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::core::UpgradeError;

/// The part of a GitHub release record the upgrade routine reads.
///
/// All other fields in the response are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseInfo {
    /// Release tag, e.g. `v1.2.3`.
    #[serde(rename = "tag_name")]
    pub tag: String,
}

impl ReleaseInfo {
    /// Decode a release record from a fully buffered response body.
    pub fn from_json(body: &[u8]) -> Result<Self, UpgradeError> {
        serde_json::from_slice(body).map_err(UpgradeError::ReleaseDecode)
    }

    /// The tag with its single leading prefix character removed.
    ///
    /// ```rust
    /// use spicetify::upgrade::release::ReleaseInfo;
    ///
    /// let release = ReleaseInfo::from_json(br#"{"tag_name":"v9.9.9"}"#).unwrap();
    /// assert_eq!(release.version().unwrap(), "9.9.9");
    /// ```
    ///
    /// # Errors
    ///
    /// [`UpgradeError::EmptyTag`] when nothing remains after stripping.
    pub fn version(&self) -> Result<String, UpgradeError> {
        let mut chars = self.tag.chars();
        chars.next();
        let version = chars.as_str();

        if version.is_empty() {
            return Err(UpgradeError::EmptyTag);
        }
        Ok(version.to_string())
    }
}

/// Queries the release metadata endpoint for the latest published version.
pub struct ReleaseResolver {
    client: reqwest::Client,
    latest_release_url: String,
}

impl ReleaseResolver {
    /// Resolver for `latest_release_url`, sharing `client` with the downloader.
    pub fn new(client: reqwest::Client, latest_release_url: impl Into<String>) -> Self {
        Self {
            client,
            latest_release_url: latest_release_url.into(),
        }
    }

    /// Fetch the latest release and return its tag without the `v` prefix.
    ///
    /// No retry is attempted; every error is recoverable from the caller's
    /// point of view because nothing on disk has been touched yet.
    pub async fn fetch_latest_tag(&self) -> Result<String, UpgradeError> {
        let url = &self.latest_release_url;
        debug!("Fetching latest release from {}", url);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|source| UpgradeError::ReleaseRequest {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpgradeError::ReleaseStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| UpgradeError::ReleaseRequest {
            url: url.clone(),
            source,
        })?;

        let version = ReleaseInfo::from_json(&body)?.version()?;
        debug!("Latest release: {}", version);
        Ok(version)
    }
}

/// Whether the running version already matches the latest release.
///
/// Versions are compared as opaque strings: any difference, including an
/// older or cosmetically different tag, counts as an available update.
pub fn is_up_to_date(current: &str, latest: &str) -> bool {
    current == latest
}
