//! File download mechanism.
//!
//! The orchestrator only depends on the [`Downloader`] trait; the curl
//! adapter is the default implementation used by the CLI.

mod curl;

pub use self::curl::{CurlDownloader, CurlOptions};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier the download mechanism assigns to one started download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One file to fetch: `url` written to `dest_dir/filename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub dest_dir: PathBuf,
    pub filename: String,
}

impl DownloadRequest {
    pub fn target_path(&self) -> PathBuf {
        self.dest_dir.join(&self.filename)
    }
}

/// Host mechanism that writes a URL's bytes to disk.
///
/// Implementations may block; async callers run them in `spawn_blocking`.
pub trait Downloader: Send + Sync {
    fn download(&self, request: &DownloadRequest) -> anyhow::Result<JobId>;
}

/// Temporary file path used while a download is in progress.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}
