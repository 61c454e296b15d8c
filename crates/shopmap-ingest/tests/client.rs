//! Integration tests for `TableClient` using wiremock HTTP mocks and temp files.

use shopmap_core::{SchemaMapping, SkipReason};
use shopmap_ingest::{DataSource, IngestError, TableClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHOPS_CSV: &str = "\
Shop_ID,Shop_Name,Province,Sales_Rep,Shop_Latitude,Shop_Longitude,Visit_Status
S001,Krabi Mart,Krabi,Somchai,8.0863,98.9063,Checked-in
S002,Trang Shop,Trang,Suda,7.5563,99.6114,Pending
S003,No Coords,Satun,Suda,,,Pending
";

fn test_client() -> TableClient {
    TableClient::new(5, "shopmap-test/0.1").expect("client construction should not fail")
}

#[tokio::test]
async fn load_from_url_normalizes_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/southern_shops_distributed.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHOPS_CSV))
        .mount(&server)
        .await;

    let source = DataSource::parse(&format!(
        "{}/southern_shops_distributed.csv",
        server.uri()
    ))
    .expect("valid url");
    let loaded = test_client()
        .load(&source, SchemaMapping::builtin())
        .await
        .expect("should load");

    assert_eq!(loaded.dataset.len(), 2);
    assert_eq!(loaded.dataset.records()[0].id, "S001");
    assert!(loaded.dataset.records()[0].checked_in);
    assert_eq!(loaded.skipped.len(), 1);
    assert_eq!(
        loaded.skipped_by_reason().get(&SkipReason::MissingCoordinate),
        Some(&1)
    );
}

#[tokio::test]
async fn load_from_url_reports_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = DataSource::parse(&format!("{}/missing.csv", server.uri())).expect("valid url");
    let err = test_client()
        .load(&source, SchemaMapping::builtin())
        .await
        .unwrap_err();

    assert!(
        matches!(err, IngestError::UnexpectedStatus { status: 404, .. }),
        "expected UnexpectedStatus(404), got: {err:?}"
    );
}

#[tokio::test]
async fn load_from_url_rejects_non_tabular_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<!doctype html>\n<p>Not found</p>\n"),
        )
        .mount(&server)
        .await;

    let source = DataSource::parse(&format!("{}/shops.csv", server.uri())).expect("valid url");
    let err = test_client()
        .load(&source, SchemaMapping::builtin())
        .await
        .unwrap_err();

    assert!(
        matches!(err, IngestError::Malformed { .. }),
        "expected Malformed, got: {err:?}"
    );
}

#[tokio::test]
async fn load_from_path_reads_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("shops.csv");
    std::fs::write(&file, SHOPS_CSV).expect("write csv");

    let loaded = test_client()
        .load(&DataSource::Path(file), SchemaMapping::builtin())
        .await
        .expect("should load");

    assert_eq!(loaded.dataset.len(), 2);
    assert_eq!(loaded.dataset.records()[1].name, "Trang Shop");
}

#[tokio::test]
async fn load_from_missing_path_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = DataSource::Path(dir.path().join("absent.csv"));

    let err = test_client()
        .load(&source, SchemaMapping::builtin())
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Io { .. }), "got: {err:?}");
}

#[tokio::test]
async fn load_from_empty_file_is_malformed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("empty.csv");
    std::fs::write(&file, "").expect("write");

    let err = test_client()
        .load(&DataSource::Path(file), SchemaMapping::builtin())
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Malformed { .. }), "got: {err:?}");
}
