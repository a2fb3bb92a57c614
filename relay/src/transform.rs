//! Push-event to Travis build-request transformation.
//!
//! This module is the core of the relay: a pure mapping from a raw GitHub
//! push-event body to the outbound request description the dispatcher posts
//! to the Travis CI v3 API.
//!
//! ## Transformation Flow
//!
//! ```text
//! raw bytes → transform_push() → OutboundRequest (body + headers)
//! ```
//!
//! The mapping is synchronous and has no side effects; parsing failures are
//! surfaced as [`TransformError`] and produce no outbound request.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Travis API version sent in the `Travis-API-Version` header.
pub const TRAVIS_API_VERSION: &str = "3";

/// Substitution text for an absent `after` or `token` field.
///
/// Downstream consumers see the literal text `undefined` when a field is
/// missing, so the substitution is an explicit constant rather than a
/// validation error.
pub const MISSING_FIELD_PLACEHOLDER: &str = "undefined";

/// Errors produced by the transformation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The inbound body was not valid JSON.
    #[error("request body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The derived `Authorization` value contains bytes illegal in a header.
    #[error("token is not representable as a header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// Inbound GitHub push-event payload.
///
/// Only the two fields the transformation reads are modeled; everything else
/// in the push event is ignored. Both fields may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    /// Head commit revision of the push.
    #[serde(default)]
    pub after: Option<String>,
    /// Bearer credential for the downstream CI API.
    #[serde(default)]
    pub token: Option<String>,
}

/// Outbound body for the Travis v3 request-creation endpoint.
///
/// Fixed nested shape:
/// `{"request":{"branch":...,"config":{"env":{"STAR_CVS_REF":...}}}}`
#[derive(Debug, Clone, Serialize)]
pub struct TravisRequest {
    pub request: BuildRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildRequest {
    pub branch: String,
    pub config: BuildConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
    pub env: BuildEnv,
}

/// Environment injected into the triggered build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildEnv {
    #[serde(rename = "STAR_CVS_REF")]
    pub star_cvs_ref: String,
}

impl TravisRequest {
    pub fn new(branch: &str, star_cvs_ref: String) -> Self {
        TravisRequest {
            request: BuildRequest {
                branch: branch.to_string(),
                config: BuildConfig {
                    env: BuildEnv { star_cvs_ref },
                },
            },
        }
    }
}

/// Description of the request to forward: body plus derived header values.
///
/// The forwarding destination is deliberately not part of the description; it
/// is fixed per process by configuration and owned by the dispatcher.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub body: TravisRequest,
    /// Full `Authorization` value, `token <token>`.
    pub authorization: String,
}

impl OutboundRequest {
    /// Write the four outbound headers into `headers`.
    ///
    /// Uses insert semantics: same-named entries already present are
    /// overwritten, never appended to.
    pub fn write_headers(&self, headers: &mut HeaderMap) -> Result<(), TransformError> {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("travis-api-version"),
            HeaderValue::from_static(TRAVIS_API_VERSION),
        );
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&self.authorization)?);
        Ok(())
    }

    /// Build a fresh header map containing exactly the four outbound headers.
    pub fn header_map(&self) -> Result<HeaderMap, TransformError> {
        let mut headers = HeaderMap::new();
        self.write_headers(&mut headers)?;
        Ok(headers)
    }
}

/// Transform a raw push-event body into the outbound request description.
///
/// `branch` is the branch literal for the outbound body, supplied from
/// configuration. Absent `after`/`token` fields substitute
/// [`MISSING_FIELD_PLACEHOLDER`]; malformed JSON fails.
pub fn transform_push(raw: &[u8], branch: &str) -> Result<OutboundRequest, TransformError> {
    let event: PushEvent = serde_json::from_slice(raw)?;

    let revision = event
        .after
        .unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string());
    let token = event
        .token
        .unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string());

    Ok(OutboundRequest {
        body: TravisRequest::new(branch, revision),
        authorization: format!("token {}", token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRANCH: &str = "ds-travis-ci";

    #[test]
    fn test_transform_push_body_shape() {
        let out = transform_push(br#"{"after": "SL19e", "token": "abc123"}"#, BRANCH).unwrap();

        let body = serde_json::to_string(&out.body).unwrap();
        assert_eq!(
            body,
            r#"{"request":{"branch":"ds-travis-ci","config":{"env":{"STAR_CVS_REF":"SL19e"}}}}"#
        );
    }

    #[test]
    fn test_transform_push_headers() {
        let out = transform_push(br#"{"after": "SL19e", "token": "abc123"}"#, BRANCH).unwrap();
        let headers = out.header_map().unwrap();

        assert_eq!(headers.len(), 4);
        assert_eq!(headers[CONTENT_TYPE.as_str()], "application/json");
        assert_eq!(headers[ACCEPT.as_str()], "application/json");
        assert_eq!(headers["travis-api-version"], "3");
        assert_eq!(headers[AUTHORIZATION.as_str()], "token abc123");
    }

    #[test]
    fn test_transform_push_missing_token() {
        let out = transform_push(br#"{"after": "X"}"#, BRANCH).unwrap();

        assert_eq!(out.authorization, "token undefined");
    }

    #[test]
    fn test_transform_push_missing_after() {
        let out = transform_push(br#"{"token": "abc123"}"#, BRANCH).unwrap();

        assert_eq!(out.body.request.config.env.star_cvs_ref, "undefined");
    }

    #[test]
    fn test_transform_push_malformed_body() {
        let result = transform_push(b"not json at all", BRANCH);

        assert!(matches!(result, Err(TransformError::Parse(_))));
    }

    #[test]
    fn test_transform_push_ignores_extra_fields() {
        let raw = br#"{"after": "SL19e", "token": "abc123", "ref": "refs/heads/main", "repository": {"name": "star-sw"}}"#;
        let out = transform_push(raw, BRANCH).unwrap();

        assert_eq!(out.body.request.config.env.star_cvs_ref, "SL19e");
    }

    #[test]
    fn test_write_headers_overwrites_existing() {
        let out = transform_push(br#"{"after": "X", "token": "t"}"#, BRANCH).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));

        out.write_headers(&mut headers).unwrap();

        assert_eq!(headers[CONTENT_TYPE.as_str()], "application/json");
        assert_eq!(headers[AUTHORIZATION.as_str()], "token t");
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_transform_push_branch_from_config() {
        let out = transform_push(br#"{"after": "X", "token": "t"}"#, "other-branch").unwrap();

        assert_eq!(out.body.request.branch, "other-branch");
    }

    #[test]
    fn test_transform_push_unrepresentable_token() {
        let out = transform_push(b"{\"after\": \"X\", \"token\": \"a\\nb\"}", BRANCH).unwrap();

        assert!(matches!(out.header_map(), Err(TransformError::Header(_))));
    }
}
