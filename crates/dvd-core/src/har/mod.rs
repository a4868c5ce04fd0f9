//! HAR (HTTP Archive) import: recover a stream pair from a DevTools export.
//!
//! Used when live capture missed the playback requests but the user saved
//! the page's network log. The chosen URLs are sanitized and can be passed
//! straight to the manual download path.

mod parse;
mod resolve;

pub use resolve::{clean_har_url, extract_media_pair, HarStream, MediaPair, HAR_STREAMING_PARAMS};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_model::MediaKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn har_file(urls: &[(&str, u16)]) -> NamedTempFile {
        let entries: Vec<serde_json::Value> = urls
            .iter()
            .map(|(url, status)| {
                serde_json::json!({
                    "request": { "url": url, "headers": [] },
                    "response": { "status": status, "headers": [] }
                })
            })
            .collect();
        let har = serde_json::json!({ "log": { "version": "1.2", "entries": entries } });
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(har.to_string().as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn picks_best_quality_per_kind() {
        let f = har_file(&[
            ("https://drive.google.com/get_video_info?id=1", 200),
            ("https://rr1.example.com/videoplayback?itag=135&clen=100&range=0-10", 200),
            ("https://rr1.example.com/videoplayback?itag=137&clen=900&range=0-10&rn=2", 200),
            ("https://rr1.example.com/videoplayback?itag=140&clen=50", 200),
            ("https://rr1.example.com/videoplayback?itag=251&clen=60&rbuf=0", 200),
            ("https://rr1.example.com/videoplayback?itag=133&clen=10", 200),
        ]);
        let pair = extract_media_pair(f.path()).unwrap();
        assert_eq!(pair.video.kind, MediaKind::Video);
        assert_eq!(pair.video.url, "https://rr1.example.com/videoplayback?itag=137&clen=900");
        assert_eq!(pair.video.quality_label, "1080p");
        assert_eq!(pair.audio.url, "https://rr1.example.com/videoplayback?itag=251&clen=60");
        assert_eq!(pair.audio.quality_label, "160kbps");
    }

    #[test]
    fn redirected_stream_preferred_then_size() {
        let f = har_file(&[
            ("https://a.example.com/videoplayback?itag=137&clen=900", 200),
            ("https://b.example.com/videoplayback?itag=136&clen=5&cms_redirect=yes", 200),
            ("https://a.example.com/videoplayback?itag=251&clen=10", 200),
            ("https://c.example.com/videoplayback?itag=251&clen=20", 200),
        ]);
        let pair = extract_media_pair(f.path()).unwrap();
        assert!(pair.video.url.starts_with("https://b.example.com"));
        assert!(pair.video.redirected);
        assert!(pair.audio.url.starts_with("https://c.example.com"));
        assert_eq!(pair.audio.content_length, 20);
    }

    #[test]
    fn skips_chunks_failures_and_unknown_kinds() {
        let f = har_file(&[
            ("https://x.example.com/videoplayback?itag=299&ump=1&srfvp=1", 200),
            ("https://x.example.com/videoplayback?itag=266", 403),
            ("https://x.example.com/videoplayback?itag=18", 200),
            ("https://x.example.com/videoplayback?itag=134", 200),
            ("https://x.example.com/videoplayback?mime=audio%2Fwebm&itag=999", 200),
        ]);
        let pair = extract_media_pair(f.path()).unwrap();
        assert_eq!(pair.video.itag, Some(134));
        assert_eq!(pair.audio.itag, Some(999));
        assert_eq!(pair.audio.quality_label, "unknown");
        // encoding of the downloaded URL is preserved
        assert!(pair.audio.url.contains("mime=audio%2Fwebm"));
    }

    #[test]
    fn streaming_session_params_are_removed() {
        let f = har_file(&[
            (
                "https://x.example.com/videoplayback?itag=137&ump=1&cpn=AbC&cver=2.0&alr=yes&range=0-1",
                200,
            ),
            ("https://x.example.com/videoplayback?srfvp=1&itag=140&rn=3&rbuf=0&clen=7", 200),
        ]);
        let pair = extract_media_pair(f.path()).unwrap();
        assert_eq!(pair.video.url, "https://x.example.com/videoplayback?itag=137");
        assert_eq!(pair.audio.url, "https://x.example.com/videoplayback?itag=140&clen=7");
    }

    #[test]
    fn clean_har_url_keeps_other_params() {
        assert_eq!(
            clean_har_url("https://x/videoplayback?expire=1&cver=2.0&sig=a%3Db"),
            "https://x/videoplayback?expire=1&sig=a%3Db"
        );
        assert_eq!(clean_har_url("https://x/videoplayback?ump=1&alr=yes"), "https://x/videoplayback");
    }

    #[test]
    fn missing_audio_is_an_error() {
        let f = har_file(&[("https://x.example.com/videoplayback?itag=137", 200)]);
        let err = extract_media_pair(f.path()).unwrap_err();
        assert!(err.to_string().contains("no audio stream"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"{ not json").unwrap();
        f.flush().unwrap();
        let err = extract_media_pair(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parse HAR JSON"));
    }
}
