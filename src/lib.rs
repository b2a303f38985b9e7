//! Secure Alert Intake API
//!
//! Single-endpoint intake for security alerts raised by SIEM/XDR systems.
//! Every submission passes through the [`validator`] before it is
//! acknowledged; nothing is stored, queued or forwarded.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ALERT INTAKE SERVICE                      │
//! │                                                              │
//! │  ┌─────────────────────────────────────────────────────┐     │
//! │  │                    HTTP ADAPTER                     │     │
//! │  │   GET / , /health  |  POST /alerts  |  OpenAPI JSON │     │
//! │  └─────────────────────────┬───────────────────────────┘     │
//! │                            │ headers + raw body              │
//! │  ┌─────────────────────────▼───────────────────────────┐     │
//! │  │                   ALERT VALIDATOR                   │     │
//! │  │  api key | media type | JSON | schema | audit log   │     │
//! │  └─────────────────────────────────────────────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod validator;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use config::{IntakeConfig, LogFormat};
pub use models::*;
pub use validator::{AlertValidator, IntakeRequest, Rejection, ValidationOutcome};

/// Intake service error types
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Missing or malformed configuration
    #[error("config error: {0}")]
    Config(String),
    /// Bind, read or serve failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// API state
#[derive(Clone)]
pub struct ApiState {
    /// Validator bound to the deployment's API key
    pub validator: AlertValidator,
    /// Request bodies above this size are refused with 413
    pub max_body_bytes: usize,
}

impl ApiState {
    /// State with default limits around an existing validator
    pub fn new(validator: AlertValidator) -> Self {
        Self {
            validator,
            max_body_bytes: IntakeConfig::default().max_body_bytes,
        }
    }

    /// State for a loaded configuration
    pub fn from_config(config: &IntakeConfig) -> Result<Self, IntakeError> {
        let mut state = Self::new(AlertValidator::new(config.api_key()?));
        state.max_body_bytes = config.max_body_bytes;
        Ok(state)
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Secure Alert Intake API",
        version = "1.0.0",
        description = "Schema-checked intake for SIEM/XDR security alerts",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::alerts::receive_alert,
    ),
    components(
        schemas(
            IntakeAck, ErrorResponse,
            HealthResponse, ExpectedPayload,
            Severity, AlertStatus
        )
    ),
    tags(
        (name = "health", description = "Liveness and payload documentation"),
        (name = "alerts", description = "Alert intake")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/", get(routes::health::health_check))
        .route("/health", get(routes::health::health_check))
        .route("/alerts", post(routes::alerts::receive_alert))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(Arc::new(state))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
