//! Download orchestration for a detected (or manually supplied) stream pair.
//!
//! Planning checks the preconditions and names the files; execution hands
//! both URLs to the [`Downloader`], video first. Nothing here mutates the
//! session registry.

mod error;
mod naming;

pub use error::DownloadError;
pub use naming::{filename, parse_filename, random_suffix, FilenamePair, FILE_EXTENSION, SUFFIX_LEN};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::downloader::{DownloadRequest, Downloader, JobId};
use crate::session::{SessionId, SessionRegistry};
use crate::url_model::MediaKind;

/// Two download requests sharing one file name key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub video: DownloadRequest,
    pub audio: DownloadRequest,
}

/// Result of a successful paired download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadReceipt {
    pub video_job_id: JobId,
    pub audio_job_id: JobId,
    pub video_filename: String,
    pub audio_filename: String,
}

/// Plans the download of a session's stored candidates.
///
/// Fails with [`DownloadError::NoSession`] when no record exists, then with
/// [`DownloadError::Incomplete`] naming the first missing kind (video before audio).
pub fn plan_ready(
    registry: &SessionRegistry,
    session_id: &SessionId,
    dest_dir: &Path,
) -> Result<DownloadPlan, DownloadError> {
    if !registry.contains(session_id) {
        return Err(DownloadError::NoSession {
            session: session_id.clone(),
        });
    }
    let snapshot = registry.get(session_id);
    let missing = |kind| DownloadError::Incomplete {
        session: session_id.clone(),
        missing: kind,
    };
    let video = snapshot.video.ok_or_else(|| missing(MediaKind::Video))?;
    let audio = snapshot.audio.ok_or_else(|| missing(MediaKind::Audio))?;
    Ok(plan_manual(&video.clean_url, &audio.clean_url, dest_dir))
}

/// Plans the download of two externally supplied URLs, used as given.
pub fn plan_manual(video_url: &str, audio_url: &str, dest_dir: &Path) -> DownloadPlan {
    plan_with_names(video_url, audio_url, dest_dir, FilenamePair::generate())
}

pub(crate) fn plan_with_names(
    video_url: &str,
    audio_url: &str,
    dest_dir: &Path,
    names: FilenamePair,
) -> DownloadPlan {
    let request = |url: &str, filename: String| DownloadRequest {
        url: url.to_string(),
        dest_dir: dest_dir.to_path_buf(),
        filename,
    };
    DownloadPlan {
        video: request(video_url, names.video),
        audio: request(audio_url, names.audio),
    }
}

/// Drives the download mechanism for planned pairs.
#[derive(Clone)]
pub struct Orchestrator {
    downloader: Arc<dyn Downloader>,
}

impl Orchestrator {
    pub fn new(downloader: Arc<dyn Downloader>) -> Self {
        Self { downloader }
    }

    /// Starts both downloads, video then audio.
    ///
    /// If the audio download fails after the video one succeeded, the video
    /// file stays on disk and the audio failure is returned.
    pub fn execute(&self, plan: &DownloadPlan) -> Result<DownloadReceipt, DownloadError> {
        let video_job_id = self.start(MediaKind::Video, &plan.video)?;
        let audio_job_id = self.start(MediaKind::Audio, &plan.audio)?;
        Ok(DownloadReceipt {
            video_job_id,
            audio_job_id,
            video_filename: plan.video.filename.clone(),
            audio_filename: plan.audio.filename.clone(),
        })
    }

    /// Plans and executes the download of a session's candidates.
    pub fn download_ready(
        &self,
        registry: &SessionRegistry,
        session_id: &SessionId,
        dest_dir: &Path,
    ) -> Result<DownloadReceipt, DownloadError> {
        let plan = plan_ready(registry, session_id, dest_dir)?;
        self.execute(&plan)
    }

    /// Plans and executes the download of two supplied URLs.
    pub fn download_manual(
        &self,
        video_url: &str,
        audio_url: &str,
        dest_dir: &Path,
    ) -> Result<DownloadReceipt, DownloadError> {
        self.execute(&plan_manual(video_url, audio_url, dest_dir))
    }

    fn start(&self, kind: MediaKind, request: &DownloadRequest) -> Result<JobId, DownloadError> {
        match self.downloader.download(request) {
            Ok(id) => {
                tracing::debug!(job = %id, %kind, file = %request.filename, "download invoked");
                Ok(id)
            }
            Err(source) => {
                tracing::warn!(%kind, file = %request.filename, "download failed: {:#}", source);
                Err(DownloadError::Mechanism { kind, source })
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}
