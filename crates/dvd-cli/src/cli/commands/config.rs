//! `dvd config get|set` – read or update the configuration of the running server.

use anyhow::Result;
use dvd_core::config::DvdConfig;
use dvd_core::control::{ControlRequest, ResponseData};
use std::path::Path;

use super::call;

/// Values given on the command line; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct ConfigChanges {
    pub download_path: Option<String>,
    pub auto_download: Option<bool>,
}

impl ConfigChanges {
    fn apply(self, mut config: DvdConfig) -> DvdConfig {
        if let Some(p) = self.download_path {
            config.download_path = p;
        }
        if let Some(a) = self.auto_download {
            config.auto_download = a;
        }
        config
    }
}

async fn fetch(socket: &Path) -> Result<DvdConfig> {
    match call(socket, ControlRequest::GetConfig).await? {
        Some(ResponseData::Config(cfg)) => Ok(cfg),
        other => anyhow::bail!("unexpected response: {:?}", other),
    }
}

fn print_config(cfg: &DvdConfig) {
    println!("download_path = {}", cfg.download_path);
    println!("auto_download = {}", cfg.auto_download);
    if let Some(s) = &cfg.sessions {
        println!("sessions.ttl_secs = {}", s.ttl_secs);
        println!("sessions.sweep_interval_secs = {}", s.sweep_interval_secs);
    }
}

pub async fn run_config_get(socket: &Path) -> Result<()> {
    print_config(&fetch(socket).await?);
    Ok(())
}

pub async fn run_config_set(socket: &Path, changes: ConfigChanges) -> Result<()> {
    let current = fetch(socket).await?;
    let config = changes.apply(current);
    match call(socket, ControlRequest::SaveConfig { config }).await? {
        Some(ResponseData::Config(saved)) => print_config(&saved),
        other => anyhow::bail!("unexpected response: {:?}", other),
    }
    Ok(())
}
