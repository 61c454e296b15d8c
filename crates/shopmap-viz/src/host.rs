//! The map rendering collaborator and the values passed across it.
//!
//! A `MapHost` owns the rendering surface, camera, tiles, the clustering
//! index and the heatmap primitive. This crate only hands it layer
//! descriptions and toggles their attachment.

use serde::Serialize;
use shopmap_core::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HeatmapHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    On,
    Off,
}

/// One entry of the base-map style list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRule {
    pub feature_type: String,
    pub element_type: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOptions {
    #[serde(skip)]
    pub api_key: String,
    pub center: Position,
    pub zoom: u8,
    pub styles: Vec<StyleRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerIcon {
    pub fill_color: &'static str,
    pub fill_opacity: f32,
    pub stroke_color: &'static str,
    pub stroke_weight: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub position: Position,
    pub title: String,
    pub icon: MarkerIcon,
    /// Shown on click, not eagerly.
    pub popup_html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapOptions {
    pub radius: u32,
    pub opacity: f32,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            radius: 20,
            opacity: 0.6,
        }
    }
}

/// Rendering surface driven by [`crate::LayerManager`].
///
/// Layers are created detached. "Attached" is the `setMap(map)` state and
/// "detached" the `setMap(null)` state; removing a layer detaches it and
/// releases it for good.
pub trait MapHost {
    /// Whether the rendering surface is available. No other method is
    /// called while this is `false`.
    fn is_ready(&self) -> bool;

    /// Create the map surface. Called once per host.
    fn create_map(&mut self, options: &MapOptions);

    fn create_marker(&mut self, spec: MarkerSpec) -> MarkerHandle;

    fn set_marker_attached(&mut self, marker: MarkerHandle, attached: bool);

    fn remove_marker(&mut self, marker: MarkerHandle);

    /// Add markers to the clustering index, which attaches them.
    fn cluster_add(&mut self, markers: &[MarkerHandle]);

    /// Empty the clustering index, detaching its markers.
    fn cluster_clear(&mut self);

    fn create_heatmap(&mut self, points: &[Position], options: &HeatmapOptions) -> HeatmapHandle;

    fn set_heatmap_attached(&mut self, heatmap: HeatmapHandle, attached: bool);

    fn remove_heatmap(&mut self, heatmap: HeatmapHandle);
}
