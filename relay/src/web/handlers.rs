//! Webhook endpoint handlers.
//!
//! The push handler stays thin: it runs the pure transformation, hands the
//! result to the dispatcher, and maps the outcome onto a status code. All
//! shaping of the outbound request lives in [`crate::transform`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::forward::{ForwardError, Forwarder};
use crate::transform::transform_push;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config, forwarder: Forwarder) -> Self {
        Self {
            config: Arc::new(config),
            forwarder,
        }
    }
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Webhook response.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downstream_status: Option<u16>,
}

/// GitHub push webhook endpoint.
///
/// This endpoint:
/// 1. Transforms the raw push-event body into a Travis build request
/// 2. Forwards it to the configured endpoint (one attempt)
/// 3. Returns 200 once the forward completed at the transport level
pub async fn github_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    info!(body_length = body.len(), "github_webhook_received");

    let out = match transform_push(&body, &state.config.travis_branch) {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "github_webhook_transform_failed");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse {
                    status: "invalid_payload",
                    downstream_status: None,
                }),
            );
        }
    };

    match state.forwarder.dispatch(&out).await {
        Ok(status) => {
            info!(
                downstream_status = status.as_u16(),
                branch = %out.body.request.branch,
                "github_webhook_forwarded"
            );
            (
                StatusCode::OK,
                Json(WebhookResponse {
                    status: "forwarded",
                    downstream_status: Some(status.as_u16()),
                }),
            )
        }
        Err(e @ ForwardError::Transform(_)) => {
            warn!(error = %e, "github_webhook_transform_failed");
            (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse {
                    status: "invalid_payload",
                    downstream_status: None,
                }),
            )
        }
        Err(e) => {
            warn!(error = %e, "github_webhook_forward_failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(WebhookResponse {
                    status: "forward_failed",
                    downstream_status: None,
                }),
            )
        }
    }
}
