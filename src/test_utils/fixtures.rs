//! Fixtures standing in for real archives and extraction tools.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::upgrade::extract::ArchiveExtractor;

/// Extractor that records its invocations and either writes one file into the
/// destination or fails.
#[derive(Debug, Clone)]
pub struct FakeExtractor {
    output: Option<(String, Vec<u8>)>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl FakeExtractor {
    /// Writes `contents` to `<dest>/<file_name>` on every call.
    pub fn writing(file_name: impl Into<String>, contents: &[u8]) -> Self {
        Self {
            output: Some((file_name.into(), contents.to_vec())),
            calls: Arc::default(),
            seen: Arc::default(),
        }
    }

    /// Fails every call with a permission error.
    pub fn failing() -> Self {
        Self {
            output: None,
            calls: Arc::default(),
            seen: Arc::default(),
        }
    }

    /// Number of times `extract` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(archive, dest)` pairs passed to `extract`, in call order.
    pub fn invocations(&self) -> Vec<(PathBuf, PathBuf)> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl ArchiveExtractor for FakeExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((archive.to_path_buf(), dest.to_path_buf()));
        }

        match &self.output {
            Some((name, contents)) => tokio::fs::write(dest.join(name), contents).await,
            None => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission denied",
            )),
        }
    }
}
