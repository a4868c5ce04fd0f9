//! Media kind and format identifier detection.

use super::MediaKind;

/// Format identifiers of video-only streams.
pub const VIDEO_ITAGS: &[u32] = &[
    133, 134, 135, 136, 137, 138, 160, 243, 244, 245, 246, 247, 248, 264, 266, 272, 278, 298, 299,
    302, 303, 308, 313, 315, 330, 331, 332, 333, 334, 335, 336, 337,
];

/// Format identifiers of audio-only streams.
pub const AUDIO_ITAGS: &[u32] = &[139, 140, 141, 171, 172, 249, 250, 251];

/// Outcome of classifying one URL. `kind == None` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub kind: Option<MediaKind>,
    pub itag: Option<u32>,
}

/// Classifies a playback URL.
///
/// First match wins:
/// 1. a `mime=video` / `mime=audio` parameter (case-insensitive),
/// 2. the format identifier looked up in [`AUDIO_ITAGS`] / [`VIDEO_ITAGS`],
/// 3. otherwise unknown.
///
/// Callers are expected to have checked [`super::is_playback_url`] first.
/// Never fails; the itag is reported whenever one is present.
pub fn classify(url: &str) -> Classification {
    let itag = extract_itag(url);
    let lower = url.to_ascii_lowercase();

    let kind = if lower.contains("mime=video") {
        Some(MediaKind::Video)
    } else if lower.contains("mime=audio") {
        Some(MediaKind::Audio)
    } else {
        match itag {
            Some(n) if AUDIO_ITAGS.contains(&n) => Some(MediaKind::Audio),
            Some(n) if VIDEO_ITAGS.contains(&n) => Some(MediaKind::Video),
            _ => None,
        }
    };

    Classification { kind, itag }
}

/// First `itag=<digits>` or `itag/<digits>` token in `url`.
pub fn extract_itag(url: &str) -> Option<u32> {
    url.match_indices("itag").find_map(|(i, m)| {
        let rest = &url[i + m.len()..];
        let rest = rest.strip_prefix('=').or_else(|| rest.strip_prefix('/'))?;
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    })
}
