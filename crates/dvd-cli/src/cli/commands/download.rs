//! `dvd download` and `dvd manual-download` – start a paired download on the server.

use anyhow::Result;
use dvd_core::control::{ControlRequest, ResponseData};
use dvd_core::session::SessionId;
use std::path::Path;

use super::{call, print_receipt};

pub async fn run_download(socket: &Path, session: &str) -> Result<()> {
    let request = ControlRequest::Download {
        session_id: SessionId::from(session),
    };
    finish(call(socket, request).await?)
}

pub async fn run_manual_download(socket: &Path, video_url: &str, audio_url: &str) -> Result<()> {
    let request = ControlRequest::ManualDownload {
        video_url: video_url.to_string(),
        audio_url: audio_url.to_string(),
    };
    finish(call(socket, request).await?)
}

fn finish(data: Option<ResponseData>) -> Result<()> {
    match data {
        Some(ResponseData::Download(receipt)) => {
            print_receipt(&receipt);
            Ok(())
        }
        other => anyhow::bail!("unexpected response: {:?}", other),
    }
}
