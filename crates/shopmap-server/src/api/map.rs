use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shopmap_core::Position;
use shopmap_viz::style::{clean_map_styles, CHECKED_IN_COLOR, PENDING_COLOR};
use shopmap_viz::{HeatmapOptions, StyleRule, VisualizationMode};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ModeQuery {
    zoom: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ModeData {
    pub zoom: f64,
    pub threshold: u8,
    pub mode: VisualizationMode,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct MarkerColors {
    pub checked_in: &'static str,
    pub pending: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct MapConfigData {
    pub api_key: String,
    pub center: Position,
    pub zoom: u8,
    pub zoom_threshold: u8,
    pub styles: Vec<StyleRule>,
    pub heatmap: HeatmapOptions,
    pub marker_colors: MarkerColors,
}

pub(super) async fn get_mode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ModeQuery>,
) -> Result<Json<ApiResponse<ModeData>>, ApiError> {
    let zoom = query
        .zoom
        .as_deref()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|z| z.is_finite() && *z >= 0.0)
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "bad_request",
                "zoom must be a non-negative number",
            )
        })?;

    let threshold = state.config.zoom_threshold;
    let mode = VisualizationMode::for_zoom(zoom, threshold);

    Ok(Json(ApiResponse {
        data: ModeData {
            zoom,
            threshold,
            mode,
            label: mode.label(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_map_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<MapConfigData>>, ApiError> {
    let config = &state.config;
    let api_key = config.require_maps_api_key().map_err(|e| {
        ApiError::new(req_id.0.clone(), "configuration_missing", e.to_string())
    })?;

    let data = MapConfigData {
        api_key: api_key.to_string(),
        center: config.map_center,
        zoom: config.initial_zoom,
        zoom_threshold: config.zoom_threshold,
        styles: clean_map_styles(),
        heatmap: HeatmapOptions::default(),
        marker_colors: MarkerColors {
            checked_in: CHECKED_IN_COLOR,
            pending: PENDING_COLOR,
        },
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
