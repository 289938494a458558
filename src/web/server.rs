use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::{load_registry, ServeArgs};
use crate::config::MatchingConfig;
use crate::core::person::{PersonRecord, ReconciliationRequest};
use crate::matching::{MatchError, MatchingEngine};
use crate::reconciliation::ReconciliationEngine;
use crate::registry::FixtureRegistry;
use crate::strategy::STRATEGIES;

/// Largest accepted request body; a demographic record is a few hundred bytes
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Upper bound on one HTTP request, above the default cascade budget
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Shared application state
pub struct AppState {
    pub registry: FixtureRegistry,
    pub config: MatchingConfig,
}

impl AppState {
    pub fn new(registry: FixtureRegistry, config: MatchingConfig) -> Self {
        Self { registry, config }
    }

    fn matcher(&self) -> MatchingEngine<'_> {
        MatchingEngine::new(&self.registry, self.config.clone())
    }
}

/// Error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}

/// Body of `POST /api/raw-match`
#[derive(Debug, Deserialize)]
pub struct RawMatchRequest {
    #[serde(flatten)]
    pub person: PersonRecord,
    /// Birth-date tokens such as `ge2008-01-01`
    pub birth_date_tokens: Vec<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
    }
}

fn error_reply(status: StatusCode, error_type: &str, user_message: &str, internal: Option<&str>) -> Response {
    (
        status,
        Json(create_safe_error_response(error_type, user_message, internal)),
    )
        .into_response()
}

fn rejection_reply(rejection: &JsonRejection) -> Response {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    error_reply(
        StatusCode::BAD_REQUEST,
        "invalid_request",
        "Request body is not a valid JSON document of the expected shape",
        None,
    )
}

fn match_error_reply(error: &MatchError) -> Response {
    match error {
        MatchError::InvalidDateToken(_) | MatchError::MissingBirthDate | MatchError::InvalidBirthDate(_) => {
            error_reply(StatusCode::BAD_REQUEST, "invalid_request", &error.to_string(), None)
        }
        MatchError::UnknownStrategy(_) | MatchError::UnsupportedStrategyVersion { .. } => error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "configuration_error",
            "The server's matching configuration is invalid",
            Some(&error.to_string()),
        ),
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the registry or configuration cannot be loaded, the tokio
/// runtime cannot be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.config.resolve()?;
    let registry = load_registry(&args.registry)?;
    let state = AppState::new(registry, config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Create the application router with routes and protective middleware.
///
/// Per-IP rate limiting needs the peer address, so it is added by the server
/// rather than here.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/strategies", get(strategies_handler))
        .route("/api/match", post(match_handler))
        .route("/api/reconcile", post(reconcile_handler))
        .route("/api/raw-match", post(raw_match_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("cache-control"),
                    HeaderValue::from_static("no-store"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("strict-transport-security"),
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                // Limit concurrent requests to prevent DOS
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

async fn run_server(args: ServeArgs, state: AppState) -> anyhow::Result<()> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    let app = create_router(state).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    });

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting pds-match API server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}/api/health"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "registry_persons": state.registry.len(),
        "strategy": state.config.strategy,
    }))
}

async fn strategies_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let strategies: Vec<_> = STRATEGIES
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name,
                "version": s.version,
                "description": s.description,
            })
        })
        .collect();

    Json(serde_json::json!({
        "strategies": strategies,
        "selected": state.config.strategy,
    }))
}

async fn match_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PersonRecord>, JsonRejection>,
) -> Response {
    let Json(mut record) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_reply(&rejection),
    };

    match state.matcher().match_person(&mut record).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => match_error_reply(&e),
    }
}

async fn reconcile_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ReconciliationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_reply(&rejection),
    };

    let engine = ReconciliationEngine::new(state.matcher(), &state.registry);
    match engine.reconcile(&request).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => match_error_reply(&e),
    }
}

async fn raw_match_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RawMatchRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_reply(&rejection),
    };

    match state
        .matcher()
        .match_raw(&request.person, &request.birth_date_tokens)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => match_error_reply(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_error_response_hides_internals() {
        let response = create_safe_error_response("configuration_error", "Bad config", Some("secret path"));
        assert_eq!(response.error, "Bad config");
        assert_eq!(response.error_type, "configuration_error");
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_raw_match_request_shape() {
        let request: RawMatchRequest = serde_json::from_str(
            r#"{"given": "OCTAVIA", "family": "CHISLETT", "birth_date_tokens": ["ge2008-01-01"]}"#,
        )
        .unwrap();
        assert_eq!(request.person.given.as_deref(), Some("OCTAVIA"));
        assert_eq!(request.birth_date_tokens, vec!["ge2008-01-01"]);
    }
}
