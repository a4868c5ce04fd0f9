//! Download orchestration errors.

use thiserror::Error;

use crate::session::SessionId;
use crate::url_model::MediaKind;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Nothing was ever detected for the session (or it was cleared/evicted).
    #[error("incomplete session {session}: nothing detected yet")]
    NoSession { session: SessionId },

    /// The session lacks one of the two streams.
    #[error("incomplete session {session}: no {missing} stream detected yet")]
    Incomplete {
        session: SessionId,
        missing: MediaKind,
    },

    /// The download mechanism refused or failed the transfer.
    #[error("{kind} download failed: {source:#}")]
    Mechanism {
        kind: MediaKind,
        #[source]
        source: anyhow::Error,
    },

    /// The blocking download task panicked or was cancelled.
    #[error("download task failed: {0}")]
    TaskFailed(String),
}

impl DownloadError {
    /// True for the recoverable "try again once both streams are detected" case.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, DownloadError::NoSession { .. } | DownloadError::Incomplete { .. })
    }
}
