//! `dvd watch` – print accepted detections until interrupted.

use anyhow::Result;
use dvd_core::control::ResponseData;
use std::path::Path;

use super::print_session;
use crate::cli::control_socket;

pub async fn run_watch(socket: &Path) -> Result<()> {
    println!("Watching {} (Ctrl-C to stop)", socket.display());
    control_socket::watch(socket, |response| {
        if let Some(ResponseData::Update(update)) = response.data {
            print_session(&update.session);
        } else if let Some(err) = response.error {
            eprintln!("watch: {}", err);
        }
    })
    .await
}
