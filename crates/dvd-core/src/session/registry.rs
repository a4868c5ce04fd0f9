//! Session registry: admission, lookup and eviction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::quality::should_replace;
use crate::url_model::{classify, is_playback_url, MediaKind};

use super::{epoch_millis, Candidate, SessionId, SessionSnapshot};

/// Outcome of observing one URL for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Admission {
    /// Not a playback URL, or the media kind could not be determined.
    NotApplicable,
    /// Classified, but the stored candidate of this kind is at least as good.
    Kept { kind: MediaKind },
    /// Stored as the new candidate of `kind`.
    Accepted {
        kind: MediaKind,
        session: SessionSnapshot,
    },
}

#[derive(Debug)]
struct SessionRecord {
    video: Option<Candidate>,
    audio: Option<Candidate>,
    last_activity: Instant,
}

impl SessionRecord {
    fn new(now: Instant) -> Self {
        Self {
            video: None,
            audio: None,
            last_activity: now,
        }
    }

    fn slot(&self, kind: MediaKind) -> Option<&Candidate> {
        match kind {
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: MediaKind) -> &mut Option<Candidate> {
        match kind {
            MediaKind::Video => &mut self.video,
            MediaKind::Audio => &mut self.audio,
        }
    }

    fn refresh(&mut self, now: Instant) {
        self.last_activity = self.last_activity.max(now);
    }

    fn snapshot(&self, id: &SessionId) -> SessionSnapshot {
        SessionSnapshot {
            session_id: id.clone(),
            video: self.video.clone(),
            audio: self.audio.clone(),
            ready: self.video.is_some() && self.audio.is_some(),
        }
    }
}

/// Owns every session record, keyed by session id.
///
/// Not synchronized: the event router is its single owner and processes one
/// event at a time.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, SessionRecord>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes a request URL for `id` at the current instant.
    pub fn observe(&mut self, id: &SessionId, raw_url: &str) -> Admission {
        self.observe_at(id, raw_url, Instant::now())
    }

    /// Observes a request URL for `id` at `now`.
    ///
    /// Non-playback and unclassifiable URLs leave the registry untouched.
    /// Otherwise the quality arbiter decides whether the URL replaces the
    /// stored candidate of its kind; the session record is created on demand.
    pub fn observe_at(&mut self, id: &SessionId, raw_url: &str, now: Instant) -> Admission {
        if !is_playback_url(raw_url) {
            return Admission::NotApplicable;
        }
        let classification = classify(raw_url);
        let Some(kind) = classification.kind else {
            tracing::trace!(session = %id, itag = ?classification.itag, "unclassified playback url");
            return Admission::NotApplicable;
        };

        let incoming = Candidate::from_observed(kind, raw_url, classification.itag, epoch_millis());
        let existing = self.sessions.get(id).and_then(|r| r.slot(kind));
        if !should_replace(existing, &incoming) {
            return Admission::Kept { kind };
        }

        tracing::debug!(
            session = %id,
            %kind,
            quality = %incoming.quality_label,
            itag = ?incoming.itag,
            "candidate accepted"
        );
        let record = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| SessionRecord::new(now));
        *record.slot_mut(kind) = Some(incoming);
        record.refresh(now);
        Admission::Accepted {
            kind,
            session: record.snapshot(id),
        }
    }

    /// Explicit probe: creates the session if needed and refreshes its activity.
    pub fn touch(&mut self, id: &SessionId) {
        self.touch_at(id, Instant::now());
    }

    pub fn touch_at(&mut self, id: &SessionId, now: Instant) {
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| SessionRecord::new(now))
            .refresh(now);
    }

    /// Snapshot of `id`; an empty snapshot for unknown ids. Never creates a record.
    pub fn get(&self, id: &SessionId) -> SessionSnapshot {
        self.sessions
            .get(id)
            .map(|r| r.snapshot(id))
            .unwrap_or_else(|| SessionSnapshot::empty(id.clone()))
    }

    /// True if a record exists for `id`.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Deletes the session record.
    pub fn clear(&mut self, id: &SessionId) {
        if self.sessions.remove(id).is_some() {
            tracing::debug!(session = %id, "session cleared");
        }
    }

    /// Called when the owning context closes. Same effect as [`Self::clear`].
    pub fn drop_session(&mut self, id: &SessionId) {
        self.clear(id);
    }

    /// Removes every session whose last activity is older than `now - ttl`.
    ///
    /// The cutoff is computed once; a session active at or after the cutoff
    /// survives. Returns the number of removed sessions.
    pub fn evict_stale(&mut self, now: Instant, ttl: Duration) -> usize {
        let Some(cutoff) = now.checked_sub(ttl) else {
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|id, record| {
            let keep = record.last_activity >= cutoff;
            if !keep {
                tracing::debug!(session = %id, "evicting stale session");
            }
            keep
        });
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
