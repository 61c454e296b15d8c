mod map;
mod shops;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    dataset: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "not_loaded" | "configuration_missing" => StatusCode::SERVICE_UNAVAILABLE,
            "load_failed" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/shops", get(shops::list_shops))
        .route("/api/v1/reload", post(shops::reload))
        .route("/api/v1/mode", get(map::get_mode))
        .route("/api/v1/map-config", get(map::get_map_config))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let dataset = if state.current().await.is_some() {
        "loaded"
    } else {
        "empty"
    };

    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            dataset,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use shopmap_core::{AppConfig, Environment, Position};
    use tower::ServiceExt;

    const SHOPS_CSV: &str = "\
Shop_ID,Shop_Name,Province,Sales_Rep,Shop_Latitude,Shop_Longitude,Visit_Status,Checkin_Timestamp,Distance_From_Shop(m),Remark
S001,Krabi Mart,Krabi,Somchai,8.0863,98.9063,Checked-in,2024-05-01 09:30,12.5,ok
S002,Trang Shop,Trang,Suda,7.5563,99.6114,Pending,,,
S003,Lost Shop,Satun,Suda,,,Pending,,,
";

    fn test_config(data_source: &Path, maps_api_key: Option<&str>) -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_string(),
            data_source: data_source.display().to_string(),
            schema_path: None,
            maps_api_key: maps_api_key.map(str::to_string),
            zoom_threshold: 11,
            initial_zoom: 8,
            map_center: Position::try_new(8.5, 99.0).expect("valid"),
            fetch_timeout_secs: 5,
            user_agent: "shopmap-test/0.1".to_string(),
        }
    }

    fn write_csv(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let file = dir.path().join("shops.csv");
        std::fs::write(&file, SHOPS_CSV).expect("write csv");
        file
    }

    async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let cases = [
            ("bad_request", StatusCode::BAD_REQUEST),
            ("not_loaded", StatusCode::SERVICE_UNAVAILABLE),
            ("configuration_missing", StatusCode::SERVICE_UNAVAILABLE),
            ("load_failed", StatusCode::BAD_GATEWAY),
            ("something_else", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, expected) in cases {
            let response = ApiError::new("req-1", code, "msg").into_response();
            assert_eq!(response.status(), expected, "code {code}");
        }
    }

    #[tokio::test]
    async fn health_reports_empty_before_first_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(&dir.path().join("absent.csv"), None)).expect("state");
        let app = build_app(state);

        let (status, json) = send(&app, Method::GET, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["dataset"], "empty");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn shops_unavailable_until_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(&dir.path().join("absent.csv"), None)).expect("state");
        let app = build_app(state);

        let (status, json) = send(&app, Method::GET, "/api/v1/shops").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "not_loaded");
    }

    #[test]
    fn malformed_source_url_fails_at_startup() {
        let config = test_config(Path::new("https://exa mple.com/shops.csv"), None);
        let err = AppState::new(config).err().expect("malformed url rejected");
        assert!(err.to_string().contains("invalid data source"), "{err}");
    }

    #[tokio::test]
    async fn reload_then_list_shops() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_csv(&dir);
        let app = build_app(AppState::new(test_config(&file, None)).expect("state"));

        let (status, json) = send(&app, Method::POST, "/api/v1/reload").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["records"], 2);
        assert_eq!(json["data"]["skipped"], 1);
        assert_eq!(json["data"]["changed"], true);

        let (status, json) = send(&app, Method::GET, "/api/v1/shops").await;
        assert_eq!(status, StatusCode::OK);
        let records = json["data"]["records"].as_array().expect("records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "S001");
        assert_eq!(records[0]["checkedIn"], true);
        assert_eq!(records[0]["address"], "Krabi, ไทย");
        assert_eq!(records[1]["salesRepresentative"], "Suda");
        assert_eq!(json["data"]["summary"]["checked_in"], 1);
        assert_eq!(json["data"]["summary"]["pending"], 1);
        assert_eq!(json["data"]["skipped"]["missing_coordinate"], 1);

        let (_, json) = send(&app, Method::GET, "/api/v1/health").await;
        assert_eq!(json["data"]["dataset"], "loaded");
    }

    #[tokio::test]
    async fn identical_reload_reports_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_csv(&dir);
        let app = build_app(AppState::new(test_config(&file, None)).expect("state"));

        send(&app, Method::POST, "/api/v1/reload").await;
        let (status, json) = send(&app, Method::POST, "/api/v1/reload").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["changed"], false);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_dataset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_csv(&dir);
        let app = build_app(AppState::new(test_config(&file, None)).expect("state"));
        send(&app, Method::POST, "/api/v1/reload").await;

        std::fs::write(&file, "").expect("truncate");
        let (status, json) = send(&app, Method::POST, "/api/v1/reload").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "load_failed");

        let (status, json) = send(&app, Method::GET, "/api/v1/shops").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["records"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn mode_follows_threshold() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(AppState::new(test_config(&write_csv(&dir), None)).expect("state"));

        let (status, json) = send(&app, Method::GET, "/api/v1/mode?zoom=11").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["mode"], "clustered");
        assert_eq!(json["data"]["threshold"], 11);

        let (_, json) = send(&app, Method::GET, "/api/v1/mode?zoom=10.5").await;
        assert_eq!(json["data"]["mode"], "heatmap");
        assert_eq!(json["data"]["label"], "🔥 โหมด Heatmap");
    }

    #[tokio::test]
    async fn mode_rejects_bad_zoom() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(AppState::new(test_config(&write_csv(&dir), None)).expect("state"));

        for uri in ["/api/v1/mode?zoom=abc", "/api/v1/mode", "/api/v1/mode?zoom=-1"] {
            let (status, json) = send(&app, Method::GET, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json["error"]["code"], "bad_request");
        }
    }

    #[tokio::test]
    async fn map_config_requires_api_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(AppState::new(test_config(&write_csv(&dir), None)).expect("state"));

        let (status, json) = send(&app, Method::GET, "/api/v1/map-config").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "configuration_missing");
        assert!(json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("SHOPMAP_MAPS_API_KEY")));
    }

    #[tokio::test]
    async fn map_config_describes_presentation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(
            AppState::new(test_config(&write_csv(&dir), Some("maps-key"))).expect("state"),
        );

        let (status, json) = send(&app, Method::GET, "/api/v1/map-config").await;
        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["api_key"], "maps-key");
        assert_eq!(data["zoom"], 8);
        assert_eq!(data["zoom_threshold"], 11);
        assert_eq!(data["center"]["lat"], 8.5);
        assert_eq!(data["styles"].as_array().map(Vec::len), Some(4));
        assert_eq!(data["heatmap"]["radius"], 20);
        assert_eq!(data["marker_colors"]["checked_in"], "#9333ea");
        assert_eq!(data["marker_colors"]["pending"], "#dc2626");
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(AppState::new(test_config(&write_csv(&dir), None)).expect("state"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-abc")
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["meta"]["request_id"], "req-abc");
    }
}
