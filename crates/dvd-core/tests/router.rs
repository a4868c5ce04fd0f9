//! Event router driven through its handle, with a recording downloader.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::RecordingDownloader;
use dvd_core::config::{DvdConfig, MemoryConfigStore, SessionConfig};
use dvd_core::control::{ControlRequest, ResponseData};
use dvd_core::orchestrator::Orchestrator;
use dvd_core::router::{EventRouter, RouterHandle};
use dvd_core::session::{Admission, SessionId};
use dvd_core::url_model::MediaKind;

const VIDEO_1080: &str =
    "https://rr3---sn-abc.googlevideo.com/videoplayback?expire=1&itag=137&range=0-1000&rn=2";
const VIDEO_480: &str = "https://rr3---sn-abc.googlevideo.com/videoplayback?expire=1&itag=135&range=0-5";
const AUDIO_160: &str =
    "https://rr3---sn-abc.googlevideo.com/videoplayback?expire=1&itag=251&rbuf=0&range=0-9";

fn start(config: DvdConfig) -> (RouterHandle, Arc<RecordingDownloader>, tempfile::TempDir) {
    let recorder = Arc::new(RecordingDownloader::default());
    let root = tempfile::tempdir().unwrap();
    let router = EventRouter::new(
        Orchestrator::new(recorder.clone()),
        Arc::new(MemoryConfigStore::new(config)),
        root.path(),
    )
    .unwrap();
    let (handle, _task) = router.spawn();
    (handle, recorder, root)
}

fn sid(s: &str) -> SessionId {
    SessionId::from(s)
}

#[tokio::test]
async fn observe_then_status() {
    let (router, _rec, _root) = start(DvdConfig::default());

    let first = router.observe(sid("tab-1"), VIDEO_480).await.unwrap();
    assert!(matches!(first, Admission::Accepted { kind: MediaKind::Video, .. }));
    let better = router.observe(sid("tab-1"), VIDEO_1080).await.unwrap();
    assert!(matches!(better, Admission::Accepted { kind: MediaKind::Video, .. }));
    let worse = router.observe(sid("tab-1"), VIDEO_480).await.unwrap();
    assert_eq!(worse, Admission::Kept { kind: MediaKind::Video });
    let other = router
        .observe(sid("tab-1"), "https://www.youtube.com/api/stats/watchtime?itag=137")
        .await
        .unwrap();
    assert_eq!(other, Admission::NotApplicable);

    let resp = router.get_status(sid("tab-1")).await;
    assert!(resp.success);
    let Some(ResponseData::Session(session)) = resp.data else {
        panic!("expected session data, got {:?}", resp.data);
    };
    let video = session.video.unwrap();
    assert_eq!(video.quality_label, "1080p");
    assert_eq!(
        video.clean_url,
        "https://rr3---sn-abc.googlevideo.com/videoplayback?expire=1&itag=137"
    );
    assert!(session.audio.is_none());
    assert!(!session.ready);
}

#[tokio::test]
async fn unknown_session_status_is_empty() {
    let (router, _rec, _root) = start(DvdConfig::default());
    let resp = router.get_status(sid("nobody")).await;
    let Some(ResponseData::Session(session)) = resp.data else {
        panic!("expected session data");
    };
    assert!(session.video.is_none() && session.audio.is_none() && !session.ready);
    assert_eq!(router.sweep_now().await.unwrap(), 0);
}

#[tokio::test]
async fn download_ready_session_uses_clean_urls() {
    let (router, rec, root) = start(DvdConfig::default());
    router.observe(sid("t"), VIDEO_1080).await.unwrap();
    router.observe(sid("t"), AUDIO_160).await.unwrap();

    let resp = router.download(sid("t")).await;
    assert!(resp.success, "{:?}", resp.error);
    let Some(ResponseData::Download(receipt)) = resp.data else {
        panic!("expected receipt");
    };
    assert!(receipt.video_filename.starts_with("video_"));
    assert!(receipt.audio_filename.starts_with("audio_"));
    assert_eq!(
        rec.urls(),
        vec![
            "https://rr3---sn-abc.googlevideo.com/videoplayback?expire=1&itag=137".to_string(),
            "https://rr3---sn-abc.googlevideo.com/videoplayback?expire=1&itag=251".to_string(),
        ]
    );
    let reqs = rec.requests.lock().unwrap();
    assert_eq!(reqs[0].dest_dir, root.path().join("DriveVideos"));
}

#[tokio::test]
async fn download_incomplete_or_unknown_fails() {
    let (router, rec, _root) = start(DvdConfig::default());
    let resp = router.download(sid("missing")).await;
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("nothing detected"));

    router.observe(sid("t"), AUDIO_160).await.unwrap();
    let resp = router.download(sid("t")).await;
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("video"));
    assert!(rec.urls().is_empty());
}

#[tokio::test]
async fn manual_download_passes_urls_verbatim() {
    let (router, rec, _root) = start(DvdConfig {
        download_path: "/srv/media".into(),
        ..DvdConfig::default()
    });
    let resp = router
        .manual_download("https://v/videoplayback?range=1-2", "https://a/x")
        .await;
    assert!(resp.success);
    assert_eq!(
        rec.urls(),
        vec!["https://v/videoplayback?range=1-2".to_string(), "https://a/x".to_string()]
    );
    assert_eq!(
        rec.requests.lock().unwrap()[1].dest_dir,
        std::path::PathBuf::from("/srv/media")
    );
}

#[tokio::test]
async fn clear_and_tab_closed_forget_the_session() {
    let (router, _rec, _root) = start(DvdConfig::default());
    router.observe(sid("a"), VIDEO_1080).await.unwrap();
    router.observe(sid("b"), AUDIO_160).await.unwrap();

    assert!(router.clear(sid("a")).await.success);
    assert!(router.tab_closed(sid("b")).await.success);
    assert!(!router.download(sid("a")).await.success);

    let resp = router.get_status(sid("b")).await;
    let Some(ResponseData::Session(session)) = resp.data else {
        panic!("expected session data");
    };
    assert!(session.audio.is_none());
}

#[tokio::test]
async fn config_roundtrip_through_router() {
    let (router, _rec, _root) = start(DvdConfig::default());
    let resp = router.get_config().await;
    assert_eq!(resp.data, Some(ResponseData::Config(DvdConfig::default())));

    let resp = router
        .save_config(DvdConfig {
            download_path: "  ".into(),
            auto_download: true,
            sessions: None,
        })
        .await;
    let Some(ResponseData::Config(saved)) = resp.data else {
        panic!("expected config");
    };
    assert_eq!(saved.download_path, "DriveVideos");
    assert!(saved.auto_download);
    assert_eq!(router.get_config().await.data, Some(ResponseData::Config(saved)));
}

#[tokio::test]
async fn watch_is_rejected_as_plain_request() {
    let (router, _rec, _root) = start(DvdConfig::default());
    let resp = router.request(ControlRequest::Watch).await;
    assert!(!resp.success);
}

#[tokio::test]
async fn subscribers_see_accepted_admissions_only() {
    let (router, _rec, _root) = start(DvdConfig::default());
    let mut updates = router.subscribe();

    router.observe(sid("t"), VIDEO_1080).await.unwrap();
    router.observe(sid("t"), VIDEO_480).await.unwrap();
    router.observe(sid("t"), AUDIO_160).await.unwrap();

    let first = updates.recv().await.unwrap();
    assert_eq!(first.session_id, sid("t"));
    assert!(!first.session.ready);
    let second = updates.recv().await.unwrap();
    assert!(second.session.ready);
    assert!(updates.try_recv().is_err());
}

#[tokio::test]
async fn fire_and_forget_observation() {
    let (router, _rec, _root) = start(DvdConfig::default());
    router.observe_raw(sid("t"), VIDEO_1080).await.unwrap();
    // events are handled in order, so the status request sees the observation
    let resp = router.get_status(sid("t")).await;
    let Some(ResponseData::Session(session)) = resp.data else {
        panic!("expected session data");
    };
    assert!(session.video.is_some());
}

#[tokio::test]
async fn auto_download_fires_once_when_ready() {
    let (router, rec, _root) = start(DvdConfig {
        auto_download: true,
        ..DvdConfig::default()
    });
    router.observe(sid("t"), VIDEO_480).await.unwrap();
    router.observe(sid("t"), AUDIO_160).await.unwrap();
    // a better video on an already ready session does not trigger again
    router.observe(sid("t"), VIDEO_1080).await.unwrap();

    for _ in 0..100 {
        if rec.urls().len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    let urls = rec.urls();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].contains("itag=135"));
    assert!(urls[1].contains("itag=251"));
}

#[tokio::test]
async fn touch_creates_session_and_sweep_evicts_it() {
    let (router, _rec, _root) = start(DvdConfig {
        sessions: Some(SessionConfig {
            ttl_secs: 0,
            sweep_interval_secs: 3600,
        }),
        ..DvdConfig::default()
    });
    let resp = router.touch(sid("idle")).await;
    assert!(resp.success);
    router.observe(sid("busy"), VIDEO_1080).await.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(router.sweep_now().await.unwrap(), 2);
    assert!(!router.download(sid("busy")).await.success);
}

#[tokio::test]
async fn sweep_timer_evicts_idle_sessions() {
    let (router, _rec, _root) = start(DvdConfig {
        sessions: Some(SessionConfig {
            ttl_secs: 1,
            sweep_interval_secs: 1,
        }),
        ..DvdConfig::default()
    });
    router.observe(sid("idle"), VIDEO_1080).await.unwrap();

    // ticks at 1s (too young) and 2s (older than the ttl)
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let resp = router.get_status(sid("idle")).await;
    let Some(ResponseData::Session(session)) = resp.data else {
        panic!("expected session data");
    };
    assert!(session.video.is_none());
    assert_eq!(router.sweep_now().await.unwrap(), 0);
}
