//! JSON API tests, driving the router directly without binding a socket.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use pds_match::web::server::{create_router, AppState, MAX_BODY_SIZE};
use pds_match::{FixtureRegistry, MatchingConfig};

const FIXTURE: &str = r#"{
    "persons": [
        {"nhs_number": "9449306753", "given": ["OCTAVIA"], "family": ["CHISLETT"],
         "birth_date": "2008-09-20", "gender": "female"}
    ],
    "search_rules": [
        {"family": "CHISLETT", "birth_date": "2008-09-20",
         "result": {"kind": "matched", "nhs_number": "9449306753", "score": 0.98}}
    ],
    "redirects": {"9434765919": "9449306753"}
}"#;

fn app() -> Router {
    let registry = FixtureRegistry::from_json(FIXTURE).expect("fixture parses");
    create_router(AppState::new(registry, MatchingConfig::default()))
}

async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), MAX_BODY_SIZE).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, json) = send(get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["registry_persons"], 1);
}

#[tokio::test]
async fn test_security_headers_present() {
    let response = app().oneshot(get("/api/health")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
}

#[tokio::test]
async fn test_strategies() {
    let (status, json) = send(get("/api/strategies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["strategies"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["selected"]["name"], "cascade");
    assert_eq!(json["selected"]["version"], 2);
}

#[tokio::test]
async fn test_match_endpoint() {
    let (status, json) = send(post_json(
        "/api/match",
        r#"{"given": "OCTAVIA", "family": "CHISLETT", "birth_date": "2008-09-20"}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Match");
    assert_eq!(json["nhs_number"], "9449306753");
    assert_eq!(json["process_stage"], "ExactGFD");
}

#[tokio::test]
async fn test_match_endpoint_poor_input_is_an_outcome() {
    let (status, json) = send(post_json("/api/match", r#"{"given": "OCTAVIA"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Error");
    assert_eq!(json["quality"]["family"], "NotProvided");
    assert_eq!(json["quality"]["birth_date"], "NotProvided");
}

#[tokio::test]
async fn test_reconcile_endpoint() {
    let (status, json) = send(post_json(
        "/api/reconcile",
        r#"{"nhs_number": "9434765919", "given": "OCTAVIA", "family": "CHISLETT",
            "birth_date": "2008-09-20", "gender": "female"}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "LocalNhsNumberIsSuperseded");
    assert_eq!(json["person"]["nhs_number"], "9449306753");
}

#[tokio::test]
async fn test_raw_match_endpoint() {
    let (status, json) = send(post_json(
        "/api/raw-match",
        r#"{"given": "OCTAVIA", "family": "CHISLETT", "birth_date_tokens": ["ge2008-01-01", "le2008-12-31"]}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Match");

    let (status, json) = send(post_json(
        "/api/raw-match",
        r#"{"given": "OCTAVIA", "family": "CHISLETT", "birth_date_tokens": ["2008"]}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_malformed_body_rejected_safely() {
    let (status, json) = send(post_json("/api/match", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_request");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let padding = "x".repeat(MAX_BODY_SIZE + 1);
    let body = format!(r#"{{"given": "{padding}"}}"#);
    let response = app().oneshot(post_json("/api/match", &body)).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app().oneshot(get("/api/identify")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
