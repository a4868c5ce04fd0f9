//! Request and response envelopes.

use serde::{Deserialize, Serialize};

use crate::config::DvdConfig;
use crate::orchestrator::DownloadReceipt;
use crate::router::SessionUpdate;
use crate::session::{Admission, SessionId, SessionSnapshot};

/// One controller or relay request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Relay of an observed request URL.
    Observe { session_id: SessionId, url: String },
    /// Explicit probe keeping a session alive.
    Touch { session_id: SessionId },
    GetStatus { session_id: SessionId },
    Download { session_id: SessionId },
    ManualDownload { video_url: String, audio_url: String },
    Clear { session_id: SessionId },
    /// The owning context (tab) closed.
    TabClosed { session_id: SessionId },
    GetConfig,
    SaveConfig { config: DvdConfig },
    /// Stream every accepted admission until the client disconnects.
    Watch,
}

/// Payload of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseData {
    Admission(Admission),
    Session(SessionSnapshot),
    Download(DownloadReceipt),
    Config(DvdConfig),
    Update(SessionUpdate),
}

/// Success/failure envelope with an optional error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl ControlResponse {
    pub fn ok(data: ResponseData) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn done() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }
}
