#![allow(dead_code)]

pub mod media_server;

use std::sync::Mutex;

use dvd_core::downloader::{DownloadRequest, Downloader, JobId};

/// Downloader that records requests instead of transferring anything.
#[derive(Default)]
pub struct RecordingDownloader {
    pub requests: Mutex<Vec<DownloadRequest>>,
}

impl RecordingDownloader {
    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

impl Downloader for RecordingDownloader {
    fn download(&self, request: &DownloadRequest) -> anyhow::Result<JobId> {
        let mut reqs = self.requests.lock().unwrap();
        reqs.push(request.clone());
        Ok(JobId(reqs.len() as u64))
    }
}
