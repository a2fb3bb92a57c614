//! Web server module for handling inbound webhooks.
//!
//! This module provides a thin web server that:
//! - Receives GitHub push-event webhooks
//! - Rewrites them into Travis build requests
//! - Forwards the rewritten request to the configured endpoint

pub mod handlers;

pub use handlers::{github_webhook, health, AppState, HealthResponse, WebhookResponse};
