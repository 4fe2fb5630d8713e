//! Thin HTTP surface in front of the decision engine.
//!
//! Handlers invoke the engine by explicit sequential composition rather
//! than an implicit middleware chain, so each step stays independently
//! testable. Everything here is plumbing; the decisions live in
//! [`crate::engine`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Settings;
use crate::core::ClientIdentity;
use crate::engine::{AuthOutcome, Authenticator, Credentials, Request, ThreatDecisionEngine};
use crate::store::CounterStore;
use crate::utils::{create_request_span, ThreatError, ThreatResult};

/// Header carrying an opaque device fingerprint from an edge classifier
const FINGERPRINT_HEADER: &str = "x-device-fingerprint";

/// Demo credential check standing in for a real identity provider.
/// Deployments inject their own [`Authenticator`].
pub struct StaticAuthenticator {
    username: String,
    password: String,
}

impl StaticAuthenticator {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> AuthOutcome {
        if credentials.username == self.username && credentials.password == self.password {
            AuthOutcome::Success
        } else {
            AuthOutcome::Failure
        }
    }
}

#[derive(Clone)]
struct AppState {
    engine: Arc<ThreatDecisionEngine>,
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn CounterStore>,
    settings: Arc<Settings>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Build the engine's inbound request from connection metadata
fn inbound_request(
    addr: &SocketAddr,
    headers: &HeaderMap,
    method: &str,
    path: &str,
) -> ThreatResult<Request> {
    let identity = ClientIdentity::new(&addr.ip().to_string())?;
    let mut request = Request::new(identity, method, path);
    if let Some(fingerprint) = headers
        .get(FINGERPRINT_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        request = request.with_fingerprint(fingerprint);
    }
    Ok(request)
}

fn decision_response(status: u16, detail: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn invalid_identity_response(err: &ThreatError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": err.to_string() })),
    )
        .into_response()
}

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Threat Detection API is running!" }))
}

async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let span = create_request_span(&Uuid::new_v4().to_string());
    async move {
        let request = match inbound_request(&addr, &headers, "POST", "/login") {
            Ok(request) => request,
            Err(err) => return invalid_identity_response(&err),
        };
        let credentials = Credentials {
            username: payload.username,
            password: payload.password,
        };
        let decision = state
            .engine
            .decide_auth(&request, &credentials, state.authenticator.as_ref())
            .await;
        decision_response(decision.http_status, &decision.detail)
    }
    .instrument(span)
    .await
}

async fn protected_resource(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let span = create_request_span(&Uuid::new_v4().to_string());
    async move {
        let request = match inbound_request(&addr, &headers, "GET", "/api/data") {
            Ok(request) => request,
            Err(err) => return invalid_identity_response(&err),
        };
        let decision = state.engine.decide(&request).await;
        if decision.http_status == 200 {
            (StatusCode::OK, Json(json!({ "message": "Access granted" }))).into_response()
        } else {
            decision_response(decision.http_status, &decision.detail)
        }
    }
    .instrument(span)
    .await
}

async fn security_status(State(state): State<AppState>) -> impl IntoResponse {
    // Probe the store with a cheap existence check
    let store_active = state.store.exists("health:probe").await.is_ok();
    let security = &state.settings.security;
    Json(json!({
        "store": if store_active { "active" } else { "inactive" },
        "anomaly_threshold": security.anomaly_threshold,
        "rate_window_seconds": security.rate_window_seconds,
        "max_failed_attempts": security.max_failed_attempts,
        "block_ttl_seconds": security.block_ttl_seconds,
        "store_failure_policy": security.store_failure_policy.as_str(),
    }))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", post(login))
        .route("/api/data", get(protected_resource))
        .route("/security-status", get(security_status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(
    settings: Arc<Settings>,
    engine: Arc<ThreatDecisionEngine>,
    store: Arc<dyn CounterStore>,
    authenticator: Arc<dyn Authenticator>,
) -> ThreatResult<()> {
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .map_err(|err| ThreatError::Internal(format!("invalid bind address: {err}")))?;

    let app = build_router(AppState {
        engine,
        authenticator,
        store,
        settings,
    });

    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|err| ThreatError::Internal(err.to_string()))
}
