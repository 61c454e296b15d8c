//! Layer Manager: sole owner of the marker set, clustering index contents,
//! and heatmap layer attached to a [`MapHost`].

use serde::Serialize;
use shopmap_core::{Dataset, DatasetId, Position};

use crate::host::{HeatmapHandle, HeatmapOptions, MapHost, MarkerHandle};
use crate::mode::VisualizationMode;
use crate::style::marker_spec;

/// What a call to [`LayerManager::render`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Host not ready; nothing touched. Safe to call again later.
    Deferred,
    /// Requested presentation was already showing.
    Unchanged,
    /// Same dataset, visibility flipped to `to`.
    Switched {
        from: Option<VisualizationMode>,
        to: VisualizationMode,
    },
    /// Previous layers discarded and rebuilt for a new dataset.
    Rebuilt {
        markers: usize,
        mode: VisualizationMode,
    },
}

/// Read-only view of the live layer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub dataset: DatasetId,
    pub markers: usize,
    pub heatmap: bool,
    pub visible: Option<VisualizationMode>,
}

#[derive(Debug)]
struct LiveLayers {
    dataset: DatasetId,
    markers: Vec<MarkerHandle>,
    heatmap: Option<HeatmapHandle>,
    visible: Option<VisualizationMode>,
}

#[derive(Debug, Default)]
pub struct LayerManager {
    heatmap_options: HeatmapOptions,
    live: Option<LiveLayers>,
}

impl LayerManager {
    #[must_use]
    pub fn new(heatmap_options: HeatmapOptions) -> Self {
        Self {
            heatmap_options,
            live: None,
        }
    }

    /// Make `mode`'s presentation of `dataset` the only visible one.
    ///
    /// Layers for both modes are built together when the dataset identity
    /// changes; a mode change on the same dataset only flips attachment.
    pub fn render<H>(
        &mut self,
        dataset: &Dataset,
        mode: VisualizationMode,
        host: &mut H,
    ) -> RenderOutcome
    where
        H: MapHost + ?Sized,
    {
        if !host.is_ready() {
            return RenderOutcome::Deferred;
        }

        let needs_rebuild = self
            .live
            .as_ref()
            .is_none_or(|live| live.dataset != *dataset.id());

        if needs_rebuild {
            self.teardown(host);
            self.live = Some(self.build(dataset, host));
        }

        let Some(live) = self.live.as_mut() else {
            return RenderOutcome::Deferred;
        };

        let from = live.visible;
        if from != Some(mode) {
            hide(live, host);
            show(live, mode, host);
        }

        if needs_rebuild {
            tracing::debug!(
                dataset = %dataset.id(),
                markers = live.markers.len(),
                %mode,
                "layers rebuilt"
            );
            RenderOutcome::Rebuilt {
                markers: live.markers.len(),
                mode,
            }
        } else if from == Some(mode) {
            RenderOutcome::Unchanged
        } else {
            RenderOutcome::Switched { from, to: mode }
        }
    }

    /// Detach and release every layer this manager created.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: MapHost + ?Sized,
    {
        let Some(live) = self.live.take() else {
            return;
        };

        host.cluster_clear();
        for marker in live.markers {
            host.remove_marker(marker);
        }
        if let Some(heatmap) = live.heatmap {
            host.remove_heatmap(heatmap);
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<LayerSummary> {
        self.live.as_ref().map(|live| LayerSummary {
            dataset: live.dataset.clone(),
            markers: live.markers.len(),
            heatmap: live.heatmap.is_some(),
            visible: live.visible,
        })
    }

    fn build<H>(&self, dataset: &Dataset, host: &mut H) -> LiveLayers
    where
        H: MapHost + ?Sized,
    {
        let markers = dataset
            .records()
            .iter()
            .map(|record| host.create_marker(marker_spec(record)))
            .collect();

        let heatmap = if dataset.is_empty() {
            None
        } else {
            let points: Vec<Position> = dataset.positions().collect();
            Some(host.create_heatmap(&points, &self.heatmap_options))
        };

        LiveLayers {
            dataset: dataset.id().clone(),
            markers,
            heatmap,
            visible: None,
        }
    }
}

fn hide<H>(live: &mut LiveLayers, host: &mut H)
where
    H: MapHost + ?Sized,
{
    match live.visible.take() {
        Some(VisualizationMode::Clustered) => {
            host.cluster_clear();
            for &marker in &live.markers {
                host.set_marker_attached(marker, false);
            }
        }
        Some(VisualizationMode::Heatmap) => {
            if let Some(heatmap) = live.heatmap {
                host.set_heatmap_attached(heatmap, false);
            }
        }
        None => {}
    }
}

fn show<H>(live: &mut LiveLayers, mode: VisualizationMode, host: &mut H)
where
    H: MapHost + ?Sized,
{
    match mode {
        VisualizationMode::Clustered => {
            if !live.markers.is_empty() {
                host.cluster_add(&live.markers);
            }
        }
        VisualizationMode::Heatmap => {
            if let Some(heatmap) = live.heatmap {
                host.set_heatmap_attached(heatmap, true);
            }
        }
    }
    live.visible = Some(mode);
}
