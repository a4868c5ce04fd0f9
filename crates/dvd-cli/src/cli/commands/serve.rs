//! `dvd serve` – run the event router behind the control socket.

use anyhow::{Context, Result};
use dvd_core::config::TomlConfigStore;
use dvd_core::downloader::CurlDownloader;
use dvd_core::orchestrator::Orchestrator;
use dvd_core::router::EventRouter;
use std::path::Path;
use std::sync::Arc;

use crate::cli::control_socket;

pub async fn run_serve(socket: &Path, root: &Path) -> Result<()> {
    let store = TomlConfigStore::default_location()?;
    tracing::debug!(config = %store.path().display(), "using config file");
    let orchestrator = Orchestrator::new(Arc::new(CurlDownloader::default()));
    let router = EventRouter::new(orchestrator, Arc::new(store), root)?;
    let (handle, router_task) = router.spawn();

    let listener = control_socket::spawn_control_listener(handle, socket)?;
    tracing::info!(path = %socket.display(), "control socket listening");
    println!("Listening on {} (Ctrl-C to stop)", socket.display());

    tokio::signal::ctrl_c()
        .await
        .context("wait for Ctrl-C")?;
    tracing::info!("shutting down");

    // Watch connections may still hold router handles.
    listener.abort();
    router_task.abort();
    let _ = std::fs::remove_file(socket);
    Ok(())
}
