//! Tests for Firestore client helpers, errors and configuration.

use std::time::Duration;

use serial_test::serial;

use crate::client::{parse_run_query_body, FirestoreConfig};
use crate::error::FirestoreError;
use crate::types::{StructuredQuery, ToFirestoreValue};

// =============================================================================
// Error mapping
// =============================================================================

#[test]
fn test_error_from_http_status_mapping() {
    assert!(matches!(
        FirestoreError::from_http_status(429, "slow down"),
        FirestoreError::RateLimited(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(503, "unavailable"),
        FirestoreError::ServerError(503, _)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(404, "missing"),
        FirestoreError::NotFound(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(409, "conflict"),
        FirestoreError::AlreadyExists(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(403, "denied"),
        FirestoreError::PermissionDenied(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(400, "bad"),
        FirestoreError::RequestFailed(_)
    ));
}

#[test]
fn test_retryable_errors() {
    assert!(FirestoreError::from_http_status(500, "x").is_retryable());
    assert!(FirestoreError::from_http_status(429, "x").is_retryable());
    assert!(!FirestoreError::from_http_status(400, "x").is_retryable());
    assert!(!FirestoreError::from_http_status(409, "x").is_retryable());
}

#[test]
fn test_http_status_round_trip() {
    for status in [401u16, 403, 404, 409, 429, 500, 502] {
        assert_eq!(
            FirestoreError::from_http_status(status, "x").http_status(),
            Some(status)
        );
    }
    assert_eq!(FirestoreError::request_failed("x").http_status(), None);
}

// =============================================================================
// Query encoding
// =============================================================================

#[test]
fn test_structured_query_serialization() {
    let query = StructuredQuery::collection("script_scores")
        .filter_eq("video_id", "abc".to_firestore_value())
        .order_desc("scored_at")
        .limit(1);

    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(json["from"][0]["collectionId"], "script_scores");
    assert_eq!(json["where"]["fieldFilter"]["field"]["fieldPath"], "video_id");
    assert_eq!(json["where"]["fieldFilter"]["op"], "EQUAL");
    assert_eq!(json["where"]["fieldFilter"]["value"]["stringValue"], "abc");
    assert_eq!(json["orderBy"][0]["direction"], "DESCENDING");
    assert_eq!(json["limit"], 1);
}

#[test]
fn test_unfiltered_query_omits_optional_parts() {
    let json = serde_json::to_value(StructuredQuery::collection("partners")).unwrap();
    assert!(json.get("where").is_none());
    assert!(json.get("orderBy").is_none());
    assert!(json.get("limit").is_none());
}

#[test]
fn test_parse_run_query_body_skips_read_time_only_entries() {
    let body = r#"[
        {"readTime": "2025-01-01T00:00:00Z"},
        {"document": {"name": "projects/p/databases/(default)/documents/script_scores/a__1",
                      "fields": {"video_id": {"stringValue": "a"}}},
         "readTime": "2025-01-01T00:00:00Z"}
    ]"#;
    let docs = parse_run_query_body(body).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].doc_id(), Some("a__1"));
    assert_eq!(docs[0].get::<String>("video_id").as_deref(), Some("a"));
}

#[test]
fn test_parse_run_query_body_rejects_garbage() {
    assert!(matches!(
        parse_run_query_body("<html>"),
        Err(FirestoreError::InvalidResponse(_))
    ));
}

// =============================================================================
// Config
// =============================================================================

#[test]
#[serial]
fn test_config_requires_project_id() {
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIREBASE_PROJECT_ID");
    assert!(FirestoreConfig::from_env().is_err());

    std::env::set_var("GCP_PROJECT_ID", " ");
    assert!(FirestoreConfig::from_env().is_err());
    std::env::remove_var("GCP_PROJECT_ID");
}

#[test]
#[serial]
fn test_config_prefers_gcp_project_id() {
    std::env::set_var("GCP_PROJECT_ID", "gcp-project");
    std::env::set_var("FIREBASE_PROJECT_ID", "firebase-project");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.project_id, "gcp-project");
    assert!(config.documents_url().contains("projects/gcp-project/databases/(default)"));
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIREBASE_PROJECT_ID");
}

#[test]
#[serial]
fn test_config_parses_timeouts_and_retry() {
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "not-a-number");
    std::env::set_var("FIRESTORE_RETRY_BASE_MS", "50");
    std::env::set_var("FIRESTORE_RETRY_MAX_MS", "2000");

    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.retry.base_delay_ms, 50);
    assert_eq!(config.retry.max_delay_ms, 2000);

    for var in [
        "GCP_PROJECT_ID",
        "FIRESTORE_CONNECT_TIMEOUT_SECS",
        "FIRESTORE_RETRY_BASE_MS",
        "FIRESTORE_RETRY_MAX_MS",
    ] {
        std::env::remove_var(var);
    }
}
