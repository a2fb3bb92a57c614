//! star-relay - GitHub push to Travis CI request relay.
//!
//! This library backs the `star-relay-web` binary: a small service that
//! receives GitHub push-event webhooks, rewrites each into a Travis CI v3
//! build request, and forwards it to a configured endpoint.
//!
//! ## Architecture
//!
//! ```text
//! GitHub push webhook → Web Server → transform → Forwarder → Travis API
//! ```

pub mod config;
pub mod forward;
pub mod transform;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use forward::{ForwardError, Forwarder};
pub use transform::{
    transform_push, OutboundRequest, PushEvent, TransformError, TravisRequest,
    MISSING_FIELD_PLACEHOLDER,
};
pub use web::AppState;
