//! Alert intake endpoint

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::middleware::auth::api_key_from_headers;
use crate::models::{ErrorResponse, IntakeAck};
use crate::validator::{IntakeRequest, Rejection};
use crate::ApiState;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Submit an alert
///
/// The body is taken raw so the API key and media type are checked before
/// any parsing happens.
#[utoipa::path(
    post,
    path = "/alerts",
    params(
        ("x-api-key" = String, Header, description = "Shared intake key")
    ),
    responses(
        (status = 200, description = "Alert accepted", body = IntakeAck),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 403, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 415, description = "Content-Type is not application/json", body = ErrorResponse),
        (status = 422, description = "Schema violation", body = ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn receive_alert(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = IntakeRequest {
        api_key: api_key_from_headers(&headers),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        body: &body,
    };

    match state.validator.validate(&request) {
        Ok(alert) => (StatusCode::OK, Json(IntakeAck::received(alert.alert_id))).into_response(),
        Err(rejection) => {
            tracing::debug!(
                status = rejection.status.as_u16(),
                reason = %rejection.message,
                "Alert rejected"
            );
            rejection.into_response()
        }
    }
}
