//! URL modeling for observed playback requests.
//!
//! Decides whether a request URL is a playback request at all, which media
//! kind it carries and with which format identifier, and strips the
//! transient range/sequence parameters so the remaining URL addresses the
//! whole resource.

mod classify;
mod path;
mod sanitize;

pub use classify::{classify, extract_itag, Classification, AUDIO_ITAGS, VIDEO_ITAGS};
pub use path::is_playback_url;
pub use sanitize::{sanitize, strip_params, TRANSIENT_PARAMS};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media category of one fragment stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Lowercase name, also used as the file name prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
