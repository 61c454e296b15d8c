//! The map session: one task that owns the host, the viewport state and the
//! layer manager, driven by events from any number of [`SessionHandle`]s.
//!
//! Events are applied in arrival order. Whatever is queued when the task
//! wakes is drained before rendering, so a burst of zoom events renders only
//! the last one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use shopmap_core::app_config::MAPS_API_KEY_VAR;
use shopmap_core::{AppConfig, Dataset, DatasetId, Position};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::host::{HeatmapOptions, MapHost, MapOptions, StyleRule};
use crate::layers::{LayerManager, LayerSummary, RenderOutcome};
use crate::mode::{ViewportState, VisualizationMode};
use crate::style::clean_map_styles;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("map session is closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// `None` puts the session in [`ViewPhase::ConfigurationMissing`].
    pub api_key: Option<String>,
    pub center: Position,
    pub initial_zoom: u8,
    pub zoom_threshold: u8,
    pub styles: Vec<StyleRule>,
    pub heatmap: HeatmapOptions,
}

impl SessionConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.maps_api_key.clone(),
            center: config.map_center,
            initial_zoom: config.initial_zoom,
            zoom_threshold: config.zoom_threshold,
            styles: clean_map_styles(),
            heatmap: HeatmapOptions::default(),
        }
    }
}

/// Loading/error indicator state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ViewPhase {
    /// No credential; the map is never created.
    ConfigurationMissing { var: String },
    Loading,
    Ready,
    /// The latest load failed. The last good dataset, if any, stays rendered.
    LoadFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    #[serde(flatten)]
    pub phase: ViewPhase,
    pub zoom: f64,
    pub mode: VisualizationMode,
    pub mode_label: &'static str,
    pub dataset: Option<DatasetId>,
    pub records: usize,
    pub layers: Option<LayerSummary>,
    /// A dataset is waiting on the map host before it can be drawn.
    pub render_deferred: bool,
}

#[derive(Debug)]
enum MapEvent {
    ZoomChanged(f64),
    HostReady,
    LoadStarted {
        generation: u64,
    },
    LoadFinished {
        generation: u64,
        result: Result<Dataset, String>,
    },
    Status(oneshot::Sender<SessionStatus>),
    Shutdown,
}

/// Cloneable sender side of a [`MapSession`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<MapEvent>,
    generation: Arc<AtomicU64>,
}

impl SessionHandle {
    /// Report a zoom change from the host's camera.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub fn zoom_changed(&self, zoom: f64) -> Result<(), SessionError> {
        self.send(MapEvent::ZoomChanged(zoom))
    }

    /// Tell the session the host's surface became available.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub fn host_ready(&self) -> Result<(), SessionError> {
        self.send(MapEvent::HostReady)
    }

    /// Start a dataset load on the current tokio runtime.
    ///
    /// Only the most recently started load is applied; a result from an older
    /// load is dropped when it arrives. The load is abandoned if the session
    /// stops first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub fn begin_load<F, E>(&self, load: F) -> Result<JoinHandle<()>, SessionError>
    where
        F: Future<Output = Result<Dataset, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.send(MapEvent::LoadStarted { generation })?;

        let tx = self.tx.clone();
        Ok(tokio::spawn(async move {
            tokio::select! {
                result = load => {
                    let result = result.map_err(|e| e.to_string());
                    if tx.send(MapEvent::LoadFinished { generation, result }).is_err() {
                        tracing::debug!(generation, "session closed before load finished");
                    }
                }
                () = tx.closed() => {
                    tracing::debug!(generation, "load abandoned; session closed");
                }
            }
        }))
    }

    /// Current phase, mode and layer summary, after every event sent before
    /// this call has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub async fn status(&self) -> Result<SessionStatus, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(MapEvent::Status(reply))?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Ask the session to tear down its layers and stop.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session already stopped.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(MapEvent::Shutdown)
    }

    fn send(&self, event: MapEvent) -> Result<(), SessionError> {
        self.tx.send(event).map_err(|_| SessionError::Closed)
    }
}

pub struct MapSession<H> {
    host: H,
    config: SessionConfig,
    viewport: ViewportState,
    layers: LayerManager,
    /// Last successfully loaded dataset.
    dataset: Option<Dataset>,
    phase: ViewPhase,
    map_created: bool,
    generation: Arc<AtomicU64>,
    rx: mpsc::UnboundedReceiver<MapEvent>,
}

impl<H> MapSession<H>
where
    H: MapHost,
{
    #[must_use]
    pub fn new(host: H, config: SessionConfig) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));

        let phase = if config.api_key.is_some() {
            ViewPhase::Loading
        } else {
            ViewPhase::ConfigurationMissing {
                var: MAPS_API_KEY_VAR.to_string(),
            }
        };

        let session = Self {
            host,
            viewport: ViewportState::new(f64::from(config.initial_zoom), config.zoom_threshold),
            layers: LayerManager::new(config.heatmap),
            config,
            dataset: None,
            phase,
            map_created: false,
            generation: Arc::clone(&generation),
            rx,
        };
        let handle = SessionHandle { tx, generation };
        (session, handle)
    }

    /// Process events until shutdown or until every handle is dropped, then
    /// tear down the layers and give the host back.
    pub async fn run(mut self) -> H {
        if let ViewPhase::ConfigurationMissing { var } = &self.phase {
            tracing::warn!(var = %var, "map credential not configured; map will not be created");
        }

        self.sync();

        let mut replies = Vec::new();
        while let Some(event) = self.rx.recv().await {
            let mut stop = self.apply(event, &mut replies);
            while !stop {
                match self.rx.try_recv() {
                    Ok(event) => stop = self.apply(event, &mut replies),
                    Err(_) => break,
                }
            }

            self.sync();
            for reply in replies.drain(..) {
                // Requester may have gone away.
                let _ = reply.send(self.status());
            }

            if stop {
                break;
            }
        }

        self.dispose();
        self.host
    }

    /// Returns `true` on shutdown.
    fn apply(&mut self, event: MapEvent, replies: &mut Vec<oneshot::Sender<SessionStatus>>) -> bool {
        match event {
            MapEvent::ZoomChanged(zoom) => {
                if let Some(transition) = self.viewport.on_zoom(zoom) {
                    tracing::debug!(
                        zoom,
                        from = %transition.from,
                        to = %transition.to,
                        "visualization mode changed"
                    );
                }
            }
            MapEvent::HostReady => {
                tracing::debug!("map host ready");
            }
            MapEvent::LoadStarted { generation } => {
                if self.accepts_data() && generation == self.current_generation() {
                    self.phase = ViewPhase::Loading;
                }
            }
            MapEvent::LoadFinished { generation, result } => {
                self.finish_load(generation, result);
            }
            MapEvent::Status(reply) => replies.push(reply),
            MapEvent::Shutdown => return true,
        }
        false
    }

    fn finish_load(&mut self, generation: u64, result: Result<Dataset, String>) {
        if generation != self.current_generation() {
            tracing::debug!(generation, "stale load result discarded");
            return;
        }
        if !self.accepts_data() {
            return;
        }

        match result {
            Ok(dataset) => {
                tracing::info!(
                    dataset = %dataset.id(),
                    records = dataset.len(),
                    "dataset ready"
                );
                self.dataset = Some(dataset);
                self.phase = ViewPhase::Ready;
            }
            Err(message) => {
                tracing::warn!(
                    error = %message,
                    keeping_previous = self.dataset.is_some(),
                    "dataset load failed"
                );
                self.phase = ViewPhase::LoadFailed { message };
            }
        }
    }

    /// Bring the host in line with the current state. No-op while the host
    /// is not ready or the credential is missing.
    fn sync(&mut self) {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return;
        };
        if !self.host.is_ready() {
            if self.dataset.is_some() {
                tracing::debug!("map host not ready; render deferred");
            }
            return;
        }

        if !self.map_created {
            let options = MapOptions {
                api_key: api_key.to_string(),
                center: self.config.center,
                zoom: self.config.initial_zoom,
                styles: self.config.styles.clone(),
            };
            self.host.create_map(&options);
            self.map_created = true;
            tracing::debug!(zoom = options.zoom, "map created");
        }

        if let Some(dataset) = &self.dataset {
            let outcome = self
                .layers
                .render(dataset, self.viewport.mode(), &mut self.host);
            if outcome == RenderOutcome::Deferred {
                tracing::debug!(dataset = %dataset.id(), "render deferred");
            }
        }
    }

    fn render_deferred(&self) -> bool {
        self.config.api_key.is_some() && self.dataset.is_some() && !self.host.is_ready()
    }

    fn dispose(&mut self) {
        self.layers.teardown(&mut self.host);
        tracing::debug!("map session disposed");
    }

    fn status(&self) -> SessionStatus {
        let mode = self.viewport.mode();
        SessionStatus {
            phase: self.phase.clone(),
            zoom: self.viewport.zoom(),
            mode,
            mode_label: mode.label(),
            dataset: self.dataset.as_ref().map(|d| d.id().clone()),
            records: self.dataset.as_ref().map_or(0, Dataset::len),
            layers: self.layers.summary(),
            render_deferred: self.render_deferred(),
        }
    }

    fn accepts_data(&self) -> bool {
        !matches!(self.phase, ViewPhase::ConfigurationMissing { .. })
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
