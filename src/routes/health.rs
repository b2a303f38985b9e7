//! Health check endpoint

use axum::{response::IntoResponse, Json};

use crate::models::{ExpectedPayload, HealthResponse};

/// Health check with the expected alert payload
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        message: "Secure Alert Intake API is live".into(),
        status: "healthy".into(),
        expected_payload: ExpectedPayload::default(),
    })
}
