//! Target resource check for observed requests.

/// Path segment that identifies a media fragment request.
const PLAYBACK_SEGMENT: &str = "videoplayback";

/// True if `url` parses and one of its path segments is `videoplayback`.
///
/// This is the precondition callers check before classifying; anything else
/// a page requests (thumbnails, API calls, scripts) is ignored.
pub fn is_playback_url(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    parsed
        .path_segments()
        .map(|mut segments| segments.any(|s| s == PLAYBACK_SEGMENT))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_playback_paths() {
        assert!(is_playback_url("https://rr3---sn-abc.c.drive.google.com/videoplayback?itag=137"));
        assert!(is_playback_url("https://host.example.com/a/videoplayback"));
    }

    #[test]
    fn rejects_other_requests() {
        assert!(!is_playback_url("https://drive.google.com/thumbnail?id=1"));
        assert!(!is_playback_url("https://example.com/videoplayback.js"));
        assert!(!is_playback_url("https://example.com/path?next=videoplayback"));
        assert!(!is_playback_url("not a url"));
        assert!(!is_playback_url(""));
    }
}
