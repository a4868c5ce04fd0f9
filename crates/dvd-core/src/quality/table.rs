//! Fixed itag → label and label → priority tables.

use crate::url_model::MediaKind;

/// Label for an unrecognised or absent format identifier.
pub const UNKNOWN_QUALITY: &str = "unknown";

/// Priority of [`UNKNOWN_QUALITY`]; below every other label.
const UNKNOWN_PRIORITY: i32 = -1;

/// Priority of a label that is not in the kind's table.
const UNRANKED_PRIORITY: i32 = 0;

const ITAG_LABELS: &[(u32, &str)] = &[
    // video, H.264
    (160, "144p"),
    (133, "240p"),
    (134, "360p"),
    (135, "480p"),
    (136, "720p"),
    (298, "720p60"),
    (137, "1080p"),
    (299, "1080p60"),
    (264, "1440p"),
    (266, "2160p"),
    (138, "4320p"),
    // video, VP9
    (278, "144p"),
    (243, "360p"),
    (244, "480p"),
    (247, "720p"),
    (302, "720p60"),
    (248, "1080p"),
    (303, "1080p60"),
    (308, "1440p60"),
    (313, "2160p"),
    (315, "2160p60"),
    (272, "4320p"),
    // audio
    (139, "48kbps"),
    (249, "50kbps"),
    (250, "70kbps"),
    (140, "128kbps"),
    (171, "128kbps"),
    (251, "160kbps"),
    (141, "256kbps"),
    (172, "256kbps"),
];

const VIDEO_PRIORITY: &[(&str, i32)] = &[
    ("144p", 1),
    ("240p", 2),
    ("360p", 3),
    ("480p", 4),
    ("720p", 5),
    ("720p60", 6),
    ("1080p", 7),
    ("1080p60", 8),
    ("1440p", 9),
    ("1440p60", 10),
    ("2160p", 11),
    ("2160p60", 12),
    ("4320p", 13),
];

const AUDIO_PRIORITY: &[(&str, i32)] = &[
    ("48kbps", 1),
    ("50kbps", 2),
    ("70kbps", 3),
    ("128kbps", 4),
    ("160kbps", 5),
    ("256kbps", 6),
];

/// Quality label for a format identifier, or [`UNKNOWN_QUALITY`].
pub fn quality_of(itag: Option<u32>) -> &'static str {
    itag.and_then(|n| ITAG_LABELS.iter().find(|(i, _)| *i == n))
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_QUALITY)
}

/// Priority of `label` within `kind`; higher is preferred.
///
/// `"unknown"` is -1, labels missing from the kind's table are 0.
pub fn priority(kind: MediaKind, label: &str) -> i32 {
    if label == UNKNOWN_QUALITY {
        return UNKNOWN_PRIORITY;
    }
    let table = match kind {
        MediaKind::Video => VIDEO_PRIORITY,
        MediaKind::Audio => AUDIO_PRIORITY,
    };
    table
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, p)| *p)
        .unwrap_or(UNRANKED_PRIORITY)
}
