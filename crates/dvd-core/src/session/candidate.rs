//! Candidate and snapshot types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::quality::quality_of;
use crate::url_model::{sanitize, MediaKind};

/// Opaque session identifier supplied by the capture side (e.g. a tab id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One detected fragment stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub kind: MediaKind,
    /// URL as observed, including range/sequence parameters.
    pub raw_url: String,
    /// `raw_url` without transient parameters; this is what gets downloaded.
    pub clean_url: String,
    /// Quality label such as `1080p` or `128kbps`, or `unknown`.
    pub quality_label: String,
    pub itag: Option<u32>,
    /// Milliseconds since the Unix epoch at admission.
    pub detected_at_ms: u64,
}

impl Candidate {
    /// Builds a candidate from an observed URL, deriving the clean URL and label.
    pub fn from_observed(
        kind: MediaKind,
        raw_url: &str,
        itag: Option<u32>,
        detected_at_ms: u64,
    ) -> Self {
        Self {
            kind,
            raw_url: raw_url.to_string(),
            clean_url: sanitize(raw_url),
            quality_label: quality_of(itag).to_string(),
            itag,
            detected_at_ms,
        }
    }
}

/// Read-only copy of a session's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub video: Option<Candidate>,
    pub audio: Option<Candidate>,
    /// Both kinds present.
    pub ready: bool,
}

impl SessionSnapshot {
    /// Snapshot of a session with no candidates.
    pub fn empty(session_id: SessionId) -> Self {
        Self {
            session_id,
            video: None,
            audio: None,
            ready: false,
        }
    }

    pub fn candidate(&self, kind: MediaKind) -> Option<&Candidate> {
        match kind {
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
