//! CLI command handlers. Each command is in its own file.

mod classify;
mod config;
mod download;
mod import_har;
mod serve;
mod session;
mod watch;

pub use classify::run_classify;
pub use config::{run_config_get, run_config_set, ConfigChanges};
pub use download::{run_download, run_manual_download};
pub use import_har::run_import_har;
pub use serve::run_serve;
pub use session::{run_clear, run_observe, run_status};
pub use watch::run_watch;

use anyhow::Result;
use dvd_core::control::{ControlRequest, ResponseData};
use dvd_core::orchestrator::DownloadReceipt;
use dvd_core::session::{Candidate, SessionSnapshot};
use std::path::Path;

use crate::cli::control_socket;

/// Sends `request` to the running server; a failure envelope becomes an error.
async fn call(socket: &Path, request: ControlRequest) -> Result<Option<ResponseData>> {
    let response = control_socket::send_request(socket, &request).await?;
    if !response.success {
        anyhow::bail!(
            "{}",
            response.error.unwrap_or_else(|| "request failed".to_string())
        );
    }
    Ok(response.data)
}

fn print_candidate(label: &str, candidate: Option<&Candidate>) {
    match candidate {
        Some(c) => {
            let itag = c.itag.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string());
            println!("  {:<6} {:<8} itag {:<4} {}", label, c.quality_label, itag, c.clean_url);
        }
        None => println!("  {:<6} -", label),
    }
}

fn print_session(session: &SessionSnapshot) {
    let state = if session.ready { "ready" } else { "incomplete" };
    println!("session {}: {}", session.session_id, state);
    print_candidate("video", session.video.as_ref());
    print_candidate("audio", session.audio.as_ref());
}

fn print_receipt(receipt: &DownloadReceipt) {
    println!("video job {}: {}", receipt.video_job_id, receipt.video_filename);
    println!("audio job {}: {}", receipt.audio_job_id, receipt.audio_filename);
}
