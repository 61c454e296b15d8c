use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shopmap_core::{DatasetId, DatasetSummary, ShopRecord, SkipReason};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ShopsData {
    pub dataset: DatasetId,
    pub loaded_at: DateTime<Utc>,
    pub summary: DatasetSummary,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub records: Vec<ShopRecord>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReloadData {
    pub dataset: DatasetId,
    pub loaded_at: DateTime<Utc>,
    pub records: usize,
    pub skipped: usize,
    pub changed: bool,
}

pub(super) async fn list_shops(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ShopsData>>, ApiError> {
    let Some(snapshot) = state.current().await else {
        return Err(ApiError::new(
            req_id.0,
            "not_loaded",
            "no dataset has been loaded yet",
        ));
    };

    let dataset = &snapshot.loaded.dataset;
    let data = ShopsData {
        dataset: dataset.id().clone(),
        loaded_at: snapshot.loaded_at,
        summary: dataset.summary(),
        skipped: snapshot.loaded.skipped_by_reason(),
        records: dataset.records().to_vec(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn reload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ReloadData>>, ApiError> {
    let outcome = state
        .reload()
        .await
        .map_err(|e| ApiError::new(req_id.0.clone(), "load_failed", e.to_string()))?;

    let loaded = &outcome.snapshot.loaded;
    let data = ReloadData {
        dataset: loaded.dataset.id().clone(),
        loaded_at: outcome.snapshot.loaded_at,
        records: loaded.dataset.len(),
        skipped: loaded.skipped.len(),
        changed: outcome.changed,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
