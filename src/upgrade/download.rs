use std::io;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::UpgradeError;
use crate::utils::progress::download_bar;

/// Download `url` into a freshly created file at `dest`.
///
/// The whole body is written and flushed before this returns; the file
/// handle is closed on every exit path. Nothing outside `dest` is touched, so
/// a failed download never puts the installed executable at risk. On failure
/// the partial file is removed.
///
/// Returns the number of bytes written.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, UpgradeError> {
    info!("Downloading {} to {}", url, dest.display());

    let result = fetch_into(client, url, dest).await;
    if result.is_err() {
        discard(dest).await;
    }
    result
}

/// Remove a downloaded archive, ignoring a file that is already gone.
///
/// Best effort: failures are logged, never returned.
pub async fn discard(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => debug!("Could not remove {}: {}", path.display(), e),
    }
}

async fn fetch_into(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64, UpgradeError> {
    let mut file = File::create(dest).await.map_err(|source| UpgradeError::TempFile {
        path: dest.to_path_buf(),
        source,
    })?;

    let download_err = |source| UpgradeError::Download {
        url: url.to_string(),
        source,
    };
    let write_err = |source| UpgradeError::DownloadWrite {
        path: dest.to_path_buf(),
        source,
    };

    let mut response = client.get(url).send().await.map_err(download_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpgradeError::DownloadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let progress = download_bar(response.content_length());
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(download_err)? {
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }

    file.flush().await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    progress.finish_and_clear();

    debug!("Downloaded {} bytes", written);
    Ok(written)
}
