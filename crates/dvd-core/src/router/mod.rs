//! Event router: the single owner of the session registry.
//!
//! Every producer (request capture, in-page relay, controllers) sends
//! [`RouterEvent`]s into one channel. The router processes them one at a
//! time, so registry mutations never interleave. Accepted admissions are
//! published to listeners; downloads run on the blocking pool and answer the
//! caller directly, without touching the registry.

mod notify;

pub use notify::{Notifier, SessionUpdate};

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{ConfigStore, DvdConfig};
use crate::control::{ControlRequest, ControlResponse, ResponseData};
use crate::orchestrator::{self, DownloadError, DownloadPlan, Orchestrator};
use crate::session::{Admission, SessionId, SessionRegistry};

/// Capacity of the inbound event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How many updates a slow listener may lag behind.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Inbound event.
#[derive(Debug)]
pub enum RouterEvent {
    /// Observed request URL; `reply` is optional for fire-and-forget capture.
    Observe {
        session_id: SessionId,
        url: String,
        reply: Option<oneshot::Sender<Admission>>,
    },
    Control {
        request: ControlRequest,
        reply: oneshot::Sender<ControlResponse>,
    },
    /// Run a staleness sweep now; replies with the number of evicted sessions.
    Sweep { reply: oneshot::Sender<usize> },
}

/// Owns the registry and collaborators; consumed by [`EventRouter::spawn`].
pub struct EventRouter {
    registry: SessionRegistry,
    orchestrator: Orchestrator,
    store: Arc<dyn ConfigStore>,
    config: DvdConfig,
    /// Base for relative download paths.
    root: PathBuf,
    notifier: Notifier,
}

impl EventRouter {
    /// Creates a router with the configuration currently in `store`.
    pub fn new(
        orchestrator: Orchestrator,
        store: Arc<dyn ConfigStore>,
        root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let config = store.load()?.normalized();
        Ok(Self {
            registry: SessionRegistry::new(),
            orchestrator,
            store,
            config,
            root: root.into(),
            notifier: Notifier::new(UPDATE_CHANNEL_CAPACITY),
        })
    }

    /// Starts the event loop. It ends once every [`RouterHandle`] is dropped.
    pub fn spawn(self) -> (RouterHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let handle = RouterHandle {
            tx,
            notifier: self.notifier.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<RouterEvent>) {
        let mut period = self.config.sweep_interval();
        let mut sweep = sweep_timer(period);
        tracing::info!(
            download_dir = %self.download_dir().display(),
            auto_download = self.config.auto_download,
            "event router started"
        );

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    self.handle(event);
                }
                _ = sweep.tick() => {
                    self.sweep();
                }
            }
            if self.config.sweep_interval() != period {
                period = self.config.sweep_interval();
                sweep = sweep_timer(period);
            }
        }
        tracing::info!(sessions = self.registry.len(), "event router stopped");
    }

    fn handle(&mut self, event: RouterEvent) {
        match event {
            RouterEvent::Observe {
                session_id,
                url,
                reply,
            } => {
                let admission = self.observe(&session_id, &url);
                if let Some(reply) = reply {
                    let _ = reply.send(admission);
                }
            }
            RouterEvent::Control { request, reply } => self.control(request, reply),
            RouterEvent::Sweep { reply } => {
                let _ = reply.send(self.sweep());
            }
        }
    }

    fn observe(&mut self, session_id: &SessionId, url: &str) -> Admission {
        let was_ready = self.registry.get(session_id).ready;
        let admission = self.registry.observe(session_id, url);
        if let Admission::Accepted { session, .. } = &admission {
            self.notifier.publish(SessionUpdate {
                session_id: session_id.clone(),
                session: session.clone(),
            });
            if session.ready && !was_ready && self.config.auto_download {
                tracing::info!(session = %session_id, "both streams detected, starting download");
                match orchestrator::plan_ready(&self.registry, session_id, &self.download_dir()) {
                    Ok(plan) => self.spawn_download(plan, None),
                    Err(e) => tracing::warn!(session = %session_id, "auto download: {}", e),
                }
            }
        }
        admission
    }

    fn control(&mut self, request: ControlRequest, reply: oneshot::Sender<ControlResponse>) {
        let response = match request {
            ControlRequest::Observe { session_id, url } => {
                ControlResponse::ok(ResponseData::Admission(self.observe(&session_id, &url)))
            }
            ControlRequest::Touch { session_id } => {
                self.registry.touch(&session_id);
                ControlResponse::ok(ResponseData::Session(self.registry.get(&session_id)))
            }
            ControlRequest::GetStatus { session_id } => {
                ControlResponse::ok(ResponseData::Session(self.registry.get(&session_id)))
            }
            ControlRequest::Download { session_id } => {
                match orchestrator::plan_ready(&self.registry, &session_id, &self.download_dir()) {
                    Ok(plan) => return self.spawn_download(plan, Some(reply)),
                    Err(e) => ControlResponse::failure(e.to_string()),
                }
            }
            ControlRequest::ManualDownload {
                video_url,
                audio_url,
            } => {
                let plan = orchestrator::plan_manual(&video_url, &audio_url, &self.download_dir());
                return self.spawn_download(plan, Some(reply));
            }
            ControlRequest::Clear { session_id } => {
                self.registry.clear(&session_id);
                ControlResponse::done()
            }
            ControlRequest::TabClosed { session_id } => {
                self.registry.drop_session(&session_id);
                ControlResponse::done()
            }
            ControlRequest::GetConfig => match self.store.load() {
                Ok(cfg) => {
                    self.config = cfg.normalized();
                    ControlResponse::ok(ResponseData::Config(self.config.clone()))
                }
                Err(e) => ControlResponse::failure(format!("{:#}", e)),
            },
            ControlRequest::SaveConfig { config } => {
                let config = config.normalized();
                match self.store.save(&config) {
                    Ok(()) => {
                        tracing::info!(?config, "configuration saved");
                        self.config = config;
                        ControlResponse::ok(ResponseData::Config(self.config.clone()))
                    }
                    Err(e) => ControlResponse::failure(format!("{:#}", e)),
                }
            }
            ControlRequest::Watch => {
                ControlResponse::failure("watch is a streaming request; subscribe to the router instead")
            }
        };
        let _ = reply.send(response);
    }

    /// Runs the plan on the blocking pool and answers `reply` when both downloads returned.
    fn spawn_download(&self, plan: DownloadPlan, reply: Option<oneshot::Sender<ControlResponse>>) {
        let orchestrator = self.orchestrator.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || orchestrator.execute(&plan))
                .await
                .unwrap_or_else(|e| Err(DownloadError::TaskFailed(e.to_string())));
            let response = match result {
                Ok(receipt) => {
                    tracing::info!(
                        video = %receipt.video_filename,
                        audio = %receipt.audio_filename,
                        "paired download finished"
                    );
                    ControlResponse::ok(ResponseData::Download(receipt))
                }
                Err(e) => {
                    tracing::warn!("paired download failed: {}", e);
                    ControlResponse::failure(e.to_string())
                }
            };
            if let Some(reply) = reply {
                let _ = reply.send(response);
            }
        });
    }

    fn sweep(&mut self) -> usize {
        let removed = self
            .registry
            .evict_stale(Instant::now(), self.config.session_ttl());
        if removed > 0 {
            tracing::info!(removed, remaining = self.registry.len(), "evicted stale sessions");
        }
        removed
    }

    fn download_dir(&self) -> PathBuf {
        self.config.download_dir(&self.root)
    }
}

fn sweep_timer(period: Duration) -> tokio::time::Interval {
    // first tick one period from now, not immediately
    let mut timer = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Cloneable sender side of the router, shared by every producer and controller.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<RouterEvent>,
    notifier: Notifier,
}

impl RouterHandle {
    /// Fire-and-forget observation from a capture source.
    pub async fn observe_raw(&self, session_id: SessionId, url: impl Into<String>) -> Result<()> {
        self.send(RouterEvent::Observe {
            session_id,
            url: url.into(),
            reply: None,
        })
        .await
    }

    /// Observation that waits for the admission outcome.
    pub async fn observe(&self, session_id: SessionId, url: impl Into<String>) -> Result<Admission> {
        let (reply, rx) = oneshot::channel();
        self.send(RouterEvent::Observe {
            session_id,
            url: url.into(),
            reply: Some(reply),
        })
        .await?;
        Ok(rx.await?)
    }

    /// Sends any controller request and waits for its envelope.
    ///
    /// A stopped router is reported as a failure envelope.
    pub async fn request(&self, request: ControlRequest) -> ControlResponse {
        let (reply, rx) = oneshot::channel();
        if self
            .send(RouterEvent::Control { request, reply })
            .await
            .is_err()
        {
            return ControlResponse::failure("event router is not running");
        }
        rx.await
            .unwrap_or_else(|_| ControlResponse::failure("event router dropped the request"))
    }

    pub async fn get_status(&self, session_id: SessionId) -> ControlResponse {
        self.request(ControlRequest::GetStatus { session_id }).await
    }

    pub async fn download(&self, session_id: SessionId) -> ControlResponse {
        self.request(ControlRequest::Download { session_id }).await
    }

    pub async fn manual_download(
        &self,
        video_url: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> ControlResponse {
        self.request(ControlRequest::ManualDownload {
            video_url: video_url.into(),
            audio_url: audio_url.into(),
        })
        .await
    }

    pub async fn clear(&self, session_id: SessionId) -> ControlResponse {
        self.request(ControlRequest::Clear { session_id }).await
    }

    pub async fn tab_closed(&self, session_id: SessionId) -> ControlResponse {
        self.request(ControlRequest::TabClosed { session_id }).await
    }

    pub async fn touch(&self, session_id: SessionId) -> ControlResponse {
        self.request(ControlRequest::Touch { session_id }).await
    }

    pub async fn get_config(&self) -> ControlResponse {
        self.request(ControlRequest::GetConfig).await
    }

    pub async fn save_config(&self, config: DvdConfig) -> ControlResponse {
        self.request(ControlRequest::SaveConfig { config }).await
    }

    /// Runs a staleness sweep immediately; returns the number of evicted sessions.
    pub async fn sweep_now(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.send(RouterEvent::Sweep { reply }).await?;
        Ok(rx.await?)
    }

    /// Receiver of every accepted admission from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.notifier.subscribe()
    }

    async fn send(&self, event: RouterEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("event router is not running"))
    }
}
