//! CLI for the DVD fragment detector.

mod commands;
mod control_socket;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    run_classify, run_clear, run_config_get, run_config_set, run_download, run_import_har,
    run_manual_download, run_observe, run_serve, run_status, run_watch, ConfigChanges,
};

/// Top-level CLI for DVD.
#[derive(Debug, Parser)]
#[command(name = "dvd")]
#[command(about = "DVD: detect split video/audio streams and download them as a pair", long_about = None)]
pub struct Cli {
    /// Control socket of a running `dvd serve` (default: XDG state dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the event router and listen on the control socket.
    Serve {
        /// Base directory for a relative download path (default: current directory).
        #[arg(long, value_name = "DIR")]
        download_root: Option<PathBuf>,
    },

    /// Show what was detected for a session.
    Status {
        /// Session identifier (e.g. tab id).
        session: String,
    },

    /// Download the detected video/audio pair of a session.
    Download { session: String },

    /// Download two explicitly given stream URLs as a pair.
    ManualDownload { video_url: String, audio_url: String },

    /// Forget everything detected for a session.
    Clear { session: String },

    /// Feed one observed request URL to the router.
    Observe { session: String, url: String },

    /// Print every accepted detection as it happens.
    Watch,

    /// Show or change the persisted configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Find the best video/audio pair in a HAR file and download it.
    ImportHar {
        /// Path to the HAR file.
        path: PathBuf,

        /// Only print the selected URLs.
        #[arg(long)]
        dry_run: bool,

        /// Base directory for a relative download path (default: current directory).
        #[arg(long, value_name = "DIR")]
        download_root: Option<PathBuf>,
    },

    /// Show how a URL would be classified.
    Classify { url: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the configuration.
    Get,

    /// Update configuration values; omitted values are kept.
    Set {
        #[arg(long, value_name = "PATH")]
        download_path: Option<String>,

        #[arg(long, value_name = "BOOL")]
        auto_download: Option<bool>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let socket = match cli.socket {
            Some(path) => path,
            None => dvd_core::control::default_control_socket_path()?,
        };
        tracing::debug!(socket = %socket.display(), "dispatching {:?}", cli.command);

        match cli.command {
            CliCommand::Serve { download_root } => {
                let root = resolve_root(download_root)?;
                run_serve(&socket, &root).await?;
            }
            CliCommand::Status { session } => run_status(&socket, &session).await?,
            CliCommand::Download { session } => run_download(&socket, &session).await?,
            CliCommand::ManualDownload {
                video_url,
                audio_url,
            } => run_manual_download(&socket, &video_url, &audio_url).await?,
            CliCommand::Clear { session } => run_clear(&socket, &session).await?,
            CliCommand::Observe { session, url } => run_observe(&socket, &session, &url).await?,
            CliCommand::Watch => run_watch(&socket).await?,
            CliCommand::Config { action } => match action {
                ConfigAction::Get => run_config_get(&socket).await?,
                ConfigAction::Set {
                    download_path,
                    auto_download,
                } => {
                    let changes = ConfigChanges {
                        download_path,
                        auto_download,
                    };
                    run_config_set(&socket, changes).await?
                }
            },
            CliCommand::ImportHar {
                path,
                dry_run,
                download_root,
            } => {
                let root = resolve_root(download_root)?;
                run_import_har(&path, &root, dry_run).await?;
            }
            CliCommand::Classify { url } => run_classify(&url),
        }

        Ok(())
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(r) => Ok(r),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests;
