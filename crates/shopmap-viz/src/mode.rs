//! Visualization State Machine: zoom level to presentation mode.

use serde::Serialize;

/// Zoom at and above which individual markers are shown.
pub const DEFAULT_ZOOM_THRESHOLD: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationMode {
    Clustered,
    Heatmap,
}

impl VisualizationMode {
    /// `Heatmap` strictly below `threshold`, `Clustered` otherwise.
    #[must_use]
    pub fn for_zoom(zoom: f64, threshold: u8) -> Self {
        if zoom < f64::from(threshold) {
            VisualizationMode::Heatmap
        } else {
            VisualizationMode::Clustered
        }
    }

    /// Label for the on-map zoom indicator.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VisualizationMode::Clustered => "📍 โหมดหมุด",
            VisualizationMode::Heatmap => "🔥 โหมด Heatmap",
        }
    }
}

impl std::fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisualizationMode::Clustered => write!(f, "clustered"),
            VisualizationMode::Heatmap => write!(f, "heatmap"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: VisualizationMode,
    pub to: VisualizationMode,
}

/// Current zoom and the mode it selects.
///
/// Level-triggered: every zoom event re-evaluates the mode, and repeating a
/// zoom value is a no-op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    threshold: u8,
    zoom: f64,
    mode: VisualizationMode,
}

impl ViewportState {
    #[must_use]
    pub fn new(initial_zoom: f64, threshold: u8) -> Self {
        Self {
            threshold,
            zoom: initial_zoom,
            mode: VisualizationMode::for_zoom(initial_zoom, threshold),
        }
    }

    /// Apply a zoom-change event. Returns the transition when the mode changed.
    ///
    /// Non-finite zoom values are ignored.
    pub fn on_zoom(&mut self, zoom: f64) -> Option<ModeTransition> {
        if !zoom.is_finite() {
            return None;
        }
        self.zoom = zoom;
        let next = VisualizationMode::for_zoom(zoom, self.threshold);
        if next == self.mode {
            return None;
        }
        let transition = ModeTransition {
            from: self.mode,
            to: next,
        };
        self.mode = next;
        Some(transition)
    }

    #[must_use]
    pub fn mode(&self) -> VisualizationMode {
        self.mode
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary_selects_clustered() {
        assert_eq!(
            VisualizationMode::for_zoom(11.0, 11),
            VisualizationMode::Clustered
        );
        assert_eq!(
            VisualizationMode::for_zoom(10.0, 11),
            VisualizationMode::Heatmap
        );
    }

    #[test]
    fn fractional_zoom_below_threshold_is_heatmap() {
        assert_eq!(
            VisualizationMode::for_zoom(10.99, 11),
            VisualizationMode::Heatmap
        );
    }

    #[test]
    fn initial_mode_comes_from_initial_zoom() {
        assert_eq!(
            ViewportState::new(8.0, DEFAULT_ZOOM_THRESHOLD).mode(),
            VisualizationMode::Heatmap
        );
        assert_eq!(
            ViewportState::new(15.0, DEFAULT_ZOOM_THRESHOLD).mode(),
            VisualizationMode::Clustered
        );
    }

    #[test]
    fn round_trip_transitions() {
        let mut state = ViewportState::new(8.0, 11);
        assert_eq!(state.on_zoom(8.0), None);
        assert_eq!(
            state.on_zoom(12.0),
            Some(ModeTransition {
                from: VisualizationMode::Heatmap,
                to: VisualizationMode::Clustered
            })
        );
        assert_eq!(
            state.on_zoom(8.0),
            Some(ModeTransition {
                from: VisualizationMode::Clustered,
                to: VisualizationMode::Heatmap
            })
        );
    }

    #[test]
    fn repeated_zoom_is_idempotent() {
        let mut state = ViewportState::new(12.0, 11);
        assert_eq!(state.on_zoom(12.0), None);
        assert_eq!(state.on_zoom(13.0), None);
        assert_eq!(state.mode(), VisualizationMode::Clustered);
        assert!((state.zoom() - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_zoom_is_ignored() {
        let mut state = ViewportState::new(12.0, 11);
        assert_eq!(state.on_zoom(f64::NAN), None);
        assert!((state.zoom() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let mut state = ViewportState::new(12.0, 14);
        assert_eq!(state.mode(), VisualizationMode::Heatmap);
        assert!(state.on_zoom(14.0).is_some());
        assert_eq!(state.mode(), VisualizationMode::Clustered);
    }
}
