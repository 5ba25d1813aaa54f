//! Stateless HTTP echo handlers. All `/api` endpoints return 200 with a
//! JSON body; a payload that is not a JSON object produces the fallback
//! body, never an error status.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use stamp_core::transform;
use stamp_core::TransformError;

use crate::server::AppState;

const GET_DEFAULT_MESSAGE: &str = "GET request";

/// Query parameters for the GET echo endpoint.
#[derive(Debug, Deserialize)]
pub struct EchoParams {
    pub message: Option<String>,
}

/// Maps an unrecoverable transform error to a 500 response. Parse failures
/// never reach this; they are recovered into the fallback body.
pub struct EchoFailure(TransformError);

impl IntoResponse for EchoFailure {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.0.error_kind(), error = %self.0, "Echo transform failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "echo transform failed").into_response()
    }
}

fn echo(payload: &str) -> Result<String, EchoFailure> {
    transform::json_echo(payload, Utc::now().timestamp_millis()).map_err(EchoFailure)
}

/// GET /api/get — echoes the optional `message` query parameter.
pub async fn get_echo(Query(params): Query<EchoParams>) -> Result<String, EchoFailure> {
    let message = params.message.as_deref().unwrap_or(GET_DEFAULT_MESSAGE);
    echo(message)
}

/// POST /api/post — echoes the raw request body.
pub async fn post_echo(body: String) -> Result<String, EchoFailure> {
    echo(&body)
}

/// PUT /api/put — echoes the raw request body.
pub async fn put_echo(body: String) -> Result<String, EchoFailure> {
    echo(&body)
}

/// GET /health — liveness plus the open-session count.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.registry.len(),
    }))
}
