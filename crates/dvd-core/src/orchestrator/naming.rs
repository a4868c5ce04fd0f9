//! Paired output file names.
//!
//! Both files of one job are named `<kind>_<epochMillis>_<suffix>.mp4` with
//! the same millis/suffix pair, which is how the external merger matches a
//! video file with its audio file.

use rand::Rng;

use crate::session::epoch_millis;
use crate::url_model::MediaKind;

/// Extension of every produced file.
pub const FILE_EXTENSION: &str = "mp4";

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 6;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// File names for the video and audio half of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePair {
    pub video: String,
    pub audio: String,
}

impl FilenamePair {
    /// Names stamped with the current time and a fresh random suffix.
    pub fn generate() -> Self {
        Self::with_parts(epoch_millis(), &random_suffix())
    }

    pub fn with_parts(epoch_ms: u64, suffix: &str) -> Self {
        Self {
            video: filename(MediaKind::Video, epoch_ms, suffix),
            audio: filename(MediaKind::Audio, epoch_ms, suffix),
        }
    }

    pub fn get(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
        }
    }
}

pub fn filename(kind: MediaKind, epoch_ms: u64, suffix: &str) -> String {
    format!("{}_{}_{}.{}", kind.as_str(), epoch_ms, suffix, FILE_EXTENSION)
}

/// Six lowercase alphanumeric characters.
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Splits a produced file name into its kind and shared `<millis>_<suffix>` key.
pub fn parse_filename(name: &str) -> Option<(MediaKind, &str)> {
    let stem = name.strip_suffix(FILE_EXTENSION)?.strip_suffix('.')?;
    let (kind, key) = stem.split_once('_')?;
    let kind = match kind {
        "video" => MediaKind::Video,
        "audio" => MediaKind::Audio,
        _ => return None,
    };
    let (millis, suffix) = key.split_once('_')?;
    let well_formed = !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && !suffix.is_empty()
        && suffix.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    well_formed.then_some((kind, key))
}
