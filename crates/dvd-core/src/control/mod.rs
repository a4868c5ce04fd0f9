//! Controller protocol and control socket location.
//!
//! Controllers (CLI, status displays, the in-page relay) talk to a running
//! router over a Unix socket, one JSON [`ControlRequest`] per line, each
//! answered by one JSON [`ControlResponse`] line.

mod protocol;

pub use protocol::{ControlRequest, ControlResponse, ResponseData};

use std::path::PathBuf;

/// Default path for the control socket (XDG state dir).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("dvd")?.get_state_home();
    Ok(dir.join("control.sock"))
}
