//! Single-stream HTTP GET download with curl.
//!
//! Streams the response body into `<target>.part` and renames it to the
//! target name once the transfer succeeded.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{temp_path, DownloadRequest, Downloader, JobId};

/// Transfer tuning passed to each easy handle.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort when slower than 1 KiB/s for this long.
    pub low_speed_time: Duration,
    pub total_timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            total_timeout: Duration::from_secs(3600),
        }
    }
}

/// [`Downloader`] backed by libcurl; job ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct CurlDownloader {
    options: CurlOptions,
    next_id: AtomicU64,
}

impl CurlDownloader {
    pub fn new(options: CurlOptions) -> Self {
        Self {
            options,
            next_id: AtomicU64::new(0),
        }
    }
}

impl Downloader for CurlDownloader {
    fn download(&self, request: &DownloadRequest) -> Result<JobId> {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        fs::create_dir_all(&request.dest_dir).with_context(|| {
            format!("create download directory: {}", request.dest_dir.display())
        })?;

        let final_path = request.target_path();
        let part = temp_path(&final_path);
        tracing::info!(job = %id, file = %final_path.display(), "download started");

        match fetch_to_file(&request.url, &part, self.options) {
            Ok(written) => {
                if let Err(e) = fs::rename(&part, &final_path) {
                    let _ = fs::remove_file(&part);
                    return Err(anyhow::Error::new(e)
                        .context(format!("rename to {}", final_path.display())));
                }
                tracing::info!(job = %id, bytes = written, file = %final_path.display(), "download completed");
                Ok(id)
            }
            Err(e) => {
                let _ = fs::remove_file(&part);
                Err(e)
            }
        }
    }
}

/// Downloads `url` with a single GET into `path`. Returns the number of bytes written.
fn fetch_to_file(url: &str, path: &std::path::Path, opts: CurlOptions) -> Result<u64> {
    let mut file =
        File::create(path).with_context(|| format!("create file: {}", path.display()))?;
    let mut written = 0u64;
    let mut write_error = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.timeout(opts.total_timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        let performed = transfer.perform();
        drop(transfer);
        if let Some(e) = write_error.take() {
            return Err(anyhow::Error::new(e).context(format!("write {}", path.display())));
        }
        performed.context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    file.sync_all()
        .with_context(|| format!("sync {}", path.display()))?;
    Ok(written)
}
