//! Viewport-driven presentation of a shop dataset: zoom-based mode
//! selection, layer lifecycle, and the session that ties them to a host.

pub mod host;
pub mod layers;
pub mod memory;
pub mod mode;
pub mod session;
pub mod style;

pub use host::{
    HeatmapHandle, HeatmapOptions, MapHost, MapOptions, MarkerHandle, MarkerIcon, MarkerSpec,
    StyleRule, Visibility,
};
pub use layers::{LayerManager, LayerSummary, RenderOutcome};
pub use memory::{HostSnapshot, InMemoryHost};
pub use mode::{ModeTransition, ViewportState, VisualizationMode, DEFAULT_ZOOM_THRESHOLD};
pub use session::{
    MapSession, SessionConfig, SessionError, SessionHandle, SessionStatus, ViewPhase,
};
