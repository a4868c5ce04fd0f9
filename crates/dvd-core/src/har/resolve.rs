//! Pick the best video and audio playback URL from a HAR file.

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use std::path::Path;

use crate::quality::{priority, quality_of};
use crate::url_model::{classify, is_playback_url, strip_params, MediaKind, TRANSIENT_PARAMS};

use super::parse::{HarEntry, HarLog};

/// Streaming-session parameters removed from HAR URLs on top of the
/// transient ones. With `ump=1` the server answers in its chunked streaming
/// format instead of sending the plain file.
pub const HAR_STREAMING_PARAMS: [&str; 5] = ["ump", "srfvp", "cpn", "cver", "alr"];

/// Removes transient and streaming-session parameters from a recorded URL.
pub fn clean_har_url(url: &str) -> String {
    let keys: Vec<&str> = TRANSIENT_PARAMS
        .iter()
        .chain(HAR_STREAMING_PARAMS.iter())
        .copied()
        .collect();
    strip_params(url, &keys)
}

/// One playback stream found in a HAR file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarStream {
    pub kind: MediaKind,
    /// Cleaned URL (see [`clean_har_url`]), ready for a whole-resource download.
    pub url: String,
    pub itag: Option<u32>,
    pub quality_label: &'static str,
    /// `clen` parameter, 0 when absent.
    pub content_length: u64,
    /// Request went through a CDN redirect (`cms_redirect=yes`).
    pub redirected: bool,
}

impl HarStream {
    fn rank(&self) -> (bool, i32, u64) {
        (
            self.redirected,
            priority(self.kind, self.quality_label),
            self.content_length,
        )
    }
}

/// Best video and audio stream of one HAR capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPair {
    pub video: HarStream,
    pub audio: HarStream,
}

/// Reads a HAR file and selects the best stream of each kind.
///
/// Streams are ranked by CDN redirect, then quality priority, then content
/// length; the earliest entry wins a tie. Fails if either kind is missing.
pub fn extract_media_pair(path: &Path) -> Result<MediaPair> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read HAR file: {}", path.display()))?;
    let har: HarLog = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse HAR JSON: {}", path.display()))?;
    select_media_pair(&har.log.entries)
}

pub(super) fn select_media_pair(entries: &[HarEntry]) -> Result<MediaPair> {
    let mut best_video: Option<HarStream> = None;
    let mut best_audio: Option<HarStream> = None;
    let mut seen = 0usize;

    for stream in entries.iter().filter_map(|e| {
        if is_playback_url(&e.request.url) {
            seen += 1;
        }
        stream_from_entry(e)
    }) {
        let slot = match stream.kind {
            MediaKind::Video => &mut best_video,
            MediaKind::Audio => &mut best_audio,
        };
        if slot.as_ref().map_or(true, |cur| stream.rank() > cur.rank()) {
            *slot = Some(stream);
        }
    }
    tracing::debug!(playback_entries = seen, "scanned HAR entries");

    let video = best_video.context("no video stream found in HAR")?;
    let audio = best_audio.context("no audio stream found in HAR")?;
    tracing::info!(
        video_itag = ?video.itag,
        audio_itag = ?audio.itag,
        video_quality = video.quality_label,
        audio_quality = audio.quality_label,
        "selected HAR streams"
    );
    Ok(MediaPair { video, audio })
}

fn stream_from_entry(entry: &HarEntry) -> Option<HarStream> {
    let raw = entry.request.url.as_str();
    if !is_playback_url(raw) {
        return None;
    }
    if entry.response.as_ref().is_some_and(|r| r.status >= 400) {
        return None;
    }
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    if is_chunk_request(&decoded) {
        tracing::trace!("skipping chunked streaming request");
        return None;
    }
    let c = classify(&decoded);
    let Some(kind) = c.kind else {
        tracing::debug!(itag = ?c.itag, "playback entry of unknown kind");
        return None;
    };
    Some(HarStream {
        kind,
        url: clean_har_url(raw),
        itag: c.itag,
        quality_label: quality_of(c.itag),
        content_length: query_number(&decoded, "clen").unwrap_or(0),
        redirected: decoded.contains("cms_redirect=yes"),
    })
}

/// Partial segment requests of the streaming player carry both `ump=1` and `srfvp=1`.
fn is_chunk_request(url: &str) -> bool {
    url.contains("ump=1") && url.contains("srfvp=1")
}

fn query_number(url: &str, key: &str) -> Option<u64> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.parse().ok())
}
