// crates/supply-sim-server/src/server.rs
// ============================================================================
// Module: Supply Sim HTTP Server
// Description: axum routes for the scenario JSON API.
// Purpose: Map HTTP requests onto the simulator service.
// Dependencies: supply-sim-config, supply-sim-providers, axum, tokio
// ============================================================================

//! ## Overview
//! Routes:
//! - `GET /api/scenario`: rows, summary, and chart series
//! - `GET /api/catalog`: stages and alternatives
//! - `POST /api/events`: run a disruption event through the LLM
//! - `POST /api/disruptions`: apply one stage/choice override
//! - `POST /api/scenario/reset`: restore defaults
//! - `GET /healthz`
//!
//! Request bodies are size-checked before decoding. Errors are returned as
//! `{error, details}` with a status code per failure class.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use supply_sim_config::SupplySimConfig;
use supply_sim_core::Choice;
use supply_sim_core::DisruptionApplier;
use supply_sim_core::RetryPolicy;
use supply_sim_core::ScenarioError;
use supply_sim_core::SharedAssessmentSource;
use supply_sim_core::StageId;
use supply_sim_providers::StructuredCallClient;
use supply_sim_providers::StructuredCallConfig;

use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::SimAuditSink;
use crate::audit::StderrAuditSink;
use crate::service::ServiceError;
use crate::service::ServiceLimits;
use crate::service::SimulatorService;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Supply Sim HTTP server instance.
pub struct SimServer {
    /// Parsed bind address.
    bind: SocketAddr,
    /// Maximum request body size.
    max_body_bytes: usize,
    /// Scenario session.
    service: Arc<SimulatorService>,
}

impl SimServer {
    /// Builds a server from configuration, reading the LLM API key from the
    /// configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`SimServerError`] when configuration, the key, or the client is unusable.
    pub async fn from_config(config: SupplySimConfig) -> Result<Self, SimServerError> {
        let api_key = std::env::var(&config.llm.api_key_env).map_err(|_| {
            SimServerError::Config(format!(
                "environment variable {} is not set",
                config.llm.api_key_env
            ))
        })?;
        let call_config = structured_call_config(&config, api_key);
        let client = tokio::task::spawn_blocking(move || StructuredCallClient::new(call_config))
            .await
            .map_err(|err| SimServerError::Init(err.to_string()))?
            .map_err(|err| SimServerError::Init(err.to_string()))?;
        Self::with_source(config, Arc::new(client))
    }

    /// Builds a server over an explicit assessment source.
    ///
    /// # Errors
    ///
    /// Returns [`SimServerError`] when configuration or the catalog is invalid.
    pub fn with_source(
        config: SupplySimConfig,
        source: SharedAssessmentSource,
    ) -> Result<Self, SimServerError> {
        config.validate().map_err(|err| SimServerError::Config(err.to_string()))?;
        let bind =
            config.server.bind_addr().map_err(|err| SimServerError::Config(err.to_string()))?;
        let catalog =
            config.load_catalog().map_err(|err| SimServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config)?;
        let applier =
            DisruptionApplier::new(source, RetryPolicy::with_attempts(config.llm.max_attempts));
        let limits = ServiceLimits {
            max_event_chars: config.server.max_event_chars,
            log_event_text: config.audit.log_event_text,
        };
        let service = SimulatorService::new(Arc::new(catalog), applier, audit, limits);
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            service: Arc::new(service),
        })
    }

    /// Returns the scenario session.
    #[must_use]
    pub fn service(&self) -> Arc<SimulatorService> {
        Arc::clone(&self.service)
    }

    /// Serves HTTP requests until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`SimServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), SimServerError> {
        let app = router(self.service, self.max_body_bytes);
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|_| SimServerError::Transport("http bind failed".to_string()))?;
        axum::serve(listener, app)
            .await
            .map_err(|_| SimServerError::Transport("http server failed".to_string()))
    }
}

/// Maps LLM configuration onto the structured-call client.
fn structured_call_config(config: &SupplySimConfig, api_key: String) -> StructuredCallConfig {
    StructuredCallConfig {
        endpoint: config.llm.endpoint.clone(),
        call_name: config.llm.call_name.clone(),
        model: config.llm.model.clone(),
        api_key,
        allow_http: config.llm.allow_http,
        timeout_ms: config.llm.timeout_ms,
        max_response_bytes: config.llm.max_response_bytes,
        ..StructuredCallConfig::default()
    }
}

/// Selects the audit sink from configuration.
fn build_audit_sink(config: &SupplySimConfig) -> Result<Arc<dyn SimAuditSink>, SimServerError> {
    if !config.audit.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.audit.path {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| SimServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Shared state for HTTP handlers.
#[derive(Clone)]
struct ServerState {
    /// Scenario session.
    service: Arc<SimulatorService>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

/// Builds the API router over a scenario session.
pub fn router(service: Arc<SimulatorService>, max_body_bytes: usize) -> Router {
    let state = ServerState {
        service,
        max_body_bytes,
    };
    Router::new()
        .route("/healthz", get(handle_health))
        .route("/api/scenario", get(handle_scenario))
        .route("/api/scenario/reset", post(handle_reset))
        .route("/api/catalog", get(handle_catalog))
        .route("/api/events", post(handle_event))
        .route("/api/disruptions", post(handle_disruption))
        .with_state(state)
}

/// Disruption event request body.
#[derive(Debug, Deserialize)]
struct EventRequest {
    /// Free-text disruption description.
    event: String,
}

/// Manual disruption request body.
#[derive(Debug, Deserialize)]
struct DisruptionRequest {
    /// Target stage.
    stage: StageId,
    /// `Default` or an alternative label of the stage.
    choice: Choice,
    /// Optional justification.
    #[serde(default)]
    reason: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable message.
    error: String,
    /// Structured details.
    details: Value,
}

/// Handles liveness probes.
async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Returns the current scenario view.
async fn handle_scenario(State(state): State<ServerState>) -> Response {
    Json(state.service.scenario().await).into_response()
}

/// Returns the catalog.
async fn handle_catalog(State(state): State<ServerState>) -> Response {
    Json(state.service.catalog().as_ref().clone()).into_response()
}

/// Restores the scenario defaults.
async fn handle_reset(State(state): State<ServerState>) -> Response {
    Json(state.service.reset().await).into_response()
}

/// Runs a disruption event.
async fn handle_event(State(state): State<ServerState>, bytes: Bytes) -> Response {
    let request: EventRequest = match decode_body(&state, &bytes) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state.service.apply_event(request.event).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => service_error_response(err),
    }
}

/// Applies a manual stage/choice override.
async fn handle_disruption(State(state): State<ServerState>, bytes: Bytes) -> Response {
    let request: DisruptionRequest = match decode_body(&state, &bytes) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state.service.apply_manual(request.stage, request.choice, request.reason).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => service_error_response(err),
    }
}

/// Size-checks and decodes a JSON request body.
fn decode_body<T: DeserializeOwned>(state: &ServerState, bytes: &Bytes) -> Result<T, Response> {
    if bytes.len() > state.max_body_bytes {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "request body too large".to_string(),
            Value::Null,
        ));
    }
    serde_json::from_slice(bytes.as_ref()).map_err(|err| {
        error_response(StatusCode::BAD_REQUEST, format!("invalid request: {err}"), Value::Null)
    })
}

/// Maps a service error onto a status code and error body.
fn service_error_response(err: ServiceError) -> Response {
    let message = err.to_string();
    match err {
        ServiceError::InvalidRequest(_) => {
            error_response(StatusCode::BAD_REQUEST, message, Value::Null)
        }
        ServiceError::Unavailable {
            attempts,
        } => error_response(StatusCode::BAD_GATEWAY, message, json!({"attempts": attempts})),
        ServiceError::Rejected {
            error,
            index,
            assessments,
        } => {
            let (stage, choice) = match &error {
                ScenarioError::UnknownStage(stage) => (stage.clone(), None),
                ScenarioError::UnknownChoice {
                    stage,
                    choice,
                } => (stage.clone(), Some(choice.clone())),
            };
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                message,
                json!({
                    "stage": stage,
                    "choice": choice,
                    "index": index,
                    "assessments": assessments,
                }),
            )
        }
        ServiceError::Internal(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, message, Value::Null)
        }
    }
}

/// Builds an error response.
fn error_response(status: StatusCode, error: String, details: Value) -> Response {
    (
        status,
        Json(ErrorBody {
            error,
            details,
        }),
    )
        .into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Supply Sim server errors.
#[derive(Debug, thiserror::Error)]
pub enum SimServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
