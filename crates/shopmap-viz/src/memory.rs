//! Headless [`MapHost`] that records layer state instead of drawing it.
//!
//! Used by the CLI `simulate` command and by tests. Clones share state, so a
//! caller can keep one clone for inspection while a session owns another.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use shopmap_core::Position;

use crate::host::{HeatmapHandle, HeatmapOptions, MapHost, MapOptions, MarkerHandle, MarkerSpec};

#[derive(Debug)]
struct MarkerState {
    title: String,
    attached: bool,
}

#[derive(Debug)]
struct HeatmapState {
    points: usize,
    attached: bool,
}

#[derive(Debug, Default)]
struct HostState {
    ready: bool,
    next_handle: u64,
    map: Option<MapOptions>,
    maps_created: usize,
    markers: BTreeMap<MarkerHandle, MarkerState>,
    clustered: BTreeSet<MarkerHandle>,
    heatmaps: BTreeMap<HeatmapHandle, HeatmapState>,
    markers_created: usize,
    heatmaps_created: usize,
    cluster_adds: usize,
    mutations: usize,
    calls_while_unready: usize,
}

impl HostState {
    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn touch(&mut self) {
        self.mutations += 1;
        if !self.ready {
            self.calls_while_unready += 1;
        }
    }
}

/// Point-in-time view of an [`InMemoryHost`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSnapshot {
    pub ready: bool,
    pub maps_created: usize,
    pub map: Option<MapOptions>,
    pub live_markers: usize,
    pub attached_markers: usize,
    pub clustered_markers: usize,
    /// Titles of live markers in creation order.
    pub live_marker_titles: Vec<String>,
    pub live_heatmaps: usize,
    pub attached_heatmaps: usize,
    /// Point count of each live heatmap.
    pub heatmap_points: Vec<usize>,
    pub markers_created: usize,
    pub heatmaps_created: usize,
    pub cluster_adds: usize,
    pub mutations: usize,
    pub calls_while_unready: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    /// A host whose surface is not available yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ready() -> Self {
        let host = Self::default();
        host.set_ready(true);
        host
    }

    pub fn set_ready(&self, ready: bool) {
        self.lock().ready = ready;
    }

    #[must_use]
    pub fn snapshot(&self) -> HostSnapshot {
        let state = self.lock();
        HostSnapshot {
            ready: state.ready,
            maps_created: state.maps_created,
            map: state.map.clone(),
            live_markers: state.markers.len(),
            attached_markers: state.markers.values().filter(|m| m.attached).count(),
            clustered_markers: state.clustered.len(),
            live_marker_titles: state.markers.values().map(|m| m.title.clone()).collect(),
            live_heatmaps: state.heatmaps.len(),
            attached_heatmaps: state.heatmaps.values().filter(|h| h.attached).count(),
            heatmap_points: state.heatmaps.values().map(|h| h.points).collect(),
            markers_created: state.markers_created,
            heatmaps_created: state.heatmaps_created,
            cluster_adds: state.cluster_adds,
            mutations: state.mutations,
            calls_while_unready: state.calls_while_unready,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MapHost for InMemoryHost {
    fn is_ready(&self) -> bool {
        self.lock().ready
    }

    fn create_map(&mut self, options: &MapOptions) {
        let mut state = self.lock();
        state.touch();
        state.maps_created += 1;
        state.map = Some(options.clone());
    }

    fn create_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        let mut state = self.lock();
        state.touch();
        let handle = MarkerHandle(state.next_handle());
        state.markers.insert(
            handle,
            MarkerState {
                title: spec.title,
                attached: false,
            },
        );
        state.markers_created += 1;
        handle
    }

    fn set_marker_attached(&mut self, marker: MarkerHandle, attached: bool) {
        let mut state = self.lock();
        state.touch();
        if let Some(m) = state.markers.get_mut(&marker) {
            m.attached = attached;
        }
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        let mut state = self.lock();
        state.touch();
        state.clustered.remove(&marker);
        state.markers.remove(&marker);
    }

    fn cluster_add(&mut self, markers: &[MarkerHandle]) {
        let mut state = self.lock();
        state.touch();
        state.cluster_adds += 1;
        for &handle in markers {
            if let Some(m) = state.markers.get_mut(&handle) {
                m.attached = true;
                state.clustered.insert(handle);
            }
        }
    }

    fn cluster_clear(&mut self) {
        let mut state = self.lock();
        state.touch();
        let clustered = std::mem::take(&mut state.clustered);
        for handle in clustered {
            if let Some(m) = state.markers.get_mut(&handle) {
                m.attached = false;
            }
        }
    }

    fn create_heatmap(&mut self, points: &[Position], _options: &HeatmapOptions) -> HeatmapHandle {
        let mut state = self.lock();
        state.touch();
        let handle = HeatmapHandle(state.next_handle());
        state.heatmaps.insert(
            handle,
            HeatmapState {
                points: points.len(),
                attached: false,
            },
        );
        state.heatmaps_created += 1;
        handle
    }

    fn set_heatmap_attached(&mut self, heatmap: HeatmapHandle, attached: bool) {
        let mut state = self.lock();
        state.touch();
        if let Some(h) = state.heatmaps.get_mut(&heatmap) {
            h.attached = attached;
        }
    }

    fn remove_heatmap(&mut self, heatmap: HeatmapHandle) {
        let mut state = self.lock();
        state.touch();
        state.heatmaps.remove(&heatmap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MarkerIcon, MarkerSpec};

    fn spec(title: &str) -> MarkerSpec {
        MarkerSpec {
            position: Position::try_new(8.0, 99.0).expect("valid"),
            title: title.to_string(),
            icon: MarkerIcon {
                fill_color: "#dc2626",
                fill_opacity: 1.0,
                stroke_color: "#ffffff",
                stroke_weight: 3.0,
                scale: 12.0,
            },
            popup_html: String::new(),
        }
    }

    #[test]
    fn markers_start_detached() {
        let mut host = InMemoryHost::ready();
        host.create_marker(spec("A"));

        let snap = host.snapshot();
        assert_eq!(snap.live_markers, 1);
        assert_eq!(snap.attached_markers, 0);
    }

    #[test]
    fn cluster_clear_detaches_members() {
        let mut host = InMemoryHost::ready();
        let a = host.create_marker(spec("A"));
        let b = host.create_marker(spec("B"));

        host.cluster_add(&[a, b]);
        assert_eq!(host.snapshot().attached_markers, 2);

        host.cluster_clear();
        let snap = host.snapshot();
        assert_eq!(snap.attached_markers, 0);
        assert_eq!(snap.clustered_markers, 0);
        assert_eq!(snap.live_markers, 2);
    }

    #[test]
    fn clones_share_state() {
        let host = InMemoryHost::new();
        let mut owned = host.clone();
        host.set_ready(true);

        owned.create_marker(spec("A"));
        assert!(owned.is_ready());
        assert_eq!(host.snapshot().live_markers, 1);
    }

    #[test]
    fn calls_before_ready_are_counted() {
        let mut host = InMemoryHost::new();
        host.create_marker(spec("A"));
        assert_eq!(host.snapshot().calls_while_unready, 1);
    }
}
