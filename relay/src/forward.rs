//! Outbound dispatch of transformed requests.
//!
//! Posts the rewritten build request to the configured Travis endpoint.
//! Exactly one attempt per inbound webhook; there is no retry and no
//! fallback destination.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::transform::{OutboundRequest, TransformError};

/// Errors produced by a forward attempt.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Header derivation failed on the outbound description.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// Transport-level failure talking to the endpoint.
    #[error("forward request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Dispatcher holding the shared HTTP client and the fixed destination.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl Forwarder {
    /// Build a dispatcher from configuration.
    pub fn new(config: &Config) -> Self {
        Forwarder {
            client: Client::new(),
            endpoint: config.travis_endpoint.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    /// Destination all requests are forwarded to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST the outbound request to the configured endpoint.
    ///
    /// Returns the downstream status code; any transport error is returned
    /// to the caller after logging.
    pub async fn dispatch(&self, out: &OutboundRequest) -> Result<StatusCode, ForwardError> {
        let headers = out.header_map()?;

        tracing::info!(
            endpoint = %self.endpoint,
            branch = %out.body.request.branch,
            timeout_seconds = self.timeout.as_secs_f64(),
            "forward_dispatch_starting"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(headers)
            .json(&out.body)
            .timeout(self.timeout)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();

                tracing::info!(
                    endpoint = %self.endpoint,
                    status_code = status.as_u16(),
                    is_success = status.is_success(),
                    "forward_dispatch_complete"
                );

                Ok(status)
            }
            Err(e) => {
                if e.is_timeout() {
                    tracing::error!(
                        endpoint = %self.endpoint,
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "forward_dispatch_timeout"
                    );
                } else if e.is_request() {
                    tracing::error!(
                        endpoint = %self.endpoint,
                        error = %e,
                        "forward_dispatch_request_error"
                    );
                } else {
                    tracing::error!(
                        endpoint = %self.endpoint,
                        error = %e,
                        "forward_dispatch_error"
                    );
                }
                Err(ForwardError::Http(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarder_endpoint_from_config() {
        let mut config = Config::from_env();
        config.travis_endpoint = Url::parse("https://putsreq.com/u10VuM9cKQSyMYbClS0F").unwrap();

        let forwarder = Forwarder::new(&config);

        assert_eq!(
            forwarder.endpoint().as_str(),
            "https://putsreq.com/u10VuM9cKQSyMYbClS0F"
        );
    }

    #[test]
    fn test_forwarder_timeout_from_config() {
        let mut config = Config::from_env();
        config.request_timeout_ms = 1234;

        let forwarder = Forwarder::new(&config);

        assert_eq!(forwarder.timeout, Duration::from_millis(1234));
    }
}
