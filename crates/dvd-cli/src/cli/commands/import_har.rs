//! `dvd import-har <path>` – download the best stream pair recorded in a HAR file.

use anyhow::{Context, Result};
use dvd_core::config;
use dvd_core::downloader::CurlDownloader;
use dvd_core::har::{self, HarStream};
use dvd_core::orchestrator::Orchestrator;
use std::path::Path;
use std::sync::Arc;

use super::print_receipt;

fn describe(stream: &HarStream) {
    let itag = stream
        .itag
        .map(|i| i.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<6} {:<8} itag {:<4} {}",
        stream.kind.as_str(),
        stream.quality_label,
        itag,
        stream.url
    );
}

pub async fn run_import_har(path: &Path, root: &Path, dry_run: bool) -> Result<()> {
    let pair = har::extract_media_pair(path)?;
    describe(&pair.video);
    describe(&pair.audio);
    if dry_run {
        return Ok(());
    }

    let cfg = config::load_or_init()?;
    let dest = cfg.download_dir(root);
    let orchestrator = Orchestrator::new(Arc::new(CurlDownloader::default()));
    let receipt = tokio::task::spawn_blocking(move || {
        orchestrator.download_manual(&pair.video.url, &pair.audio.url, &dest)
    })
    .await
    .context("download task")??;
    print_receipt(&receipt);
    Ok(())
}
