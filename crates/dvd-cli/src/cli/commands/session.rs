//! `dvd status`, `dvd clear` and `dvd observe` – per-session requests.

use anyhow::Result;
use dvd_core::control::{ControlRequest, ResponseData};
use dvd_core::session::{Admission, SessionId};
use std::path::Path;

use super::{call, print_session};

pub async fn run_status(socket: &Path, session: &str) -> Result<()> {
    let request = ControlRequest::GetStatus {
        session_id: SessionId::from(session),
    };
    match call(socket, request).await? {
        Some(ResponseData::Session(snapshot)) => print_session(&snapshot),
        other => anyhow::bail!("unexpected response: {:?}", other),
    }
    Ok(())
}

pub async fn run_clear(socket: &Path, session: &str) -> Result<()> {
    let request = ControlRequest::Clear {
        session_id: SessionId::from(session),
    };
    call(socket, request).await?;
    println!("Cleared session {}.", session);
    Ok(())
}

pub async fn run_observe(socket: &Path, session: &str, url: &str) -> Result<()> {
    let request = ControlRequest::Observe {
        session_id: SessionId::from(session),
        url: url.to_string(),
    };
    match call(socket, request).await? {
        Some(ResponseData::Admission(admission)) => match admission {
            Admission::NotApplicable => println!("Not a video or audio playback URL."),
            Admission::Kept { kind } => {
                println!("Kept the stored {} stream (same or better quality).", kind)
            }
            Admission::Accepted { kind, session } => {
                println!("Accepted as {} stream.", kind);
                print_session(&session);
            }
        },
        other => anyhow::bail!("unexpected response: {:?}", other),
    }
    Ok(())
}
