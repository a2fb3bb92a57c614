//! Configuration module for environment variable parsing.
//!
//! The forwarding destination and branch name are explicit configuration so
//! deployments can switch endpoints without code changes.

use std::env;

use tracing::warn;
use url::Url;

/// Default forwarding destination: the Travis v3 request-creation endpoint.
pub const DEFAULT_TRAVIS_ENDPOINT: &str =
    "https://api.travis-ci.org/repo/star-bnl%2Fstar-sw/requests";

/// Default branch literal for the outbound build request.
pub const DEFAULT_TRAVIS_BRANCH: &str = "ds-travis-ci";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Destination URL all transformed requests are forwarded to
    pub travis_endpoint: Url,

    /// Branch name injected into the outbound build request
    pub travis_branch: String,

    /// HTTP request timeout in milliseconds for the forward attempt
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            travis_endpoint: parse_url("TRAVIS_ENDPOINT_URL", DEFAULT_TRAVIS_ENDPOINT),

            travis_branch: env::var("TRAVIS_BRANCH")
                .unwrap_or_else(|_| DEFAULT_TRAVIS_BRANCH.to_string()),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}

/// Parse a URL from an environment variable, falling back to the default.
fn parse_url(name: &str, default: &str) -> Url {
    let fallback = || Url::parse(default).expect("default URL must parse");

    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return fallback(),
    };

    match Url::parse(&raw) {
        Ok(url) => url,
        Err(e) => {
            warn!(env_var = name, value = %raw, error = %e, "Invalid URL, using default");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = Config::from_env();
        assert_eq!(config.travis_endpoint.as_str(), DEFAULT_TRAVIS_ENDPOINT);
    }

    #[test]
    fn test_default_branch() {
        let config = Config::from_env();
        assert_eq!(config.travis_branch, "ds-travis-ci");
    }

    #[test]
    fn test_parse_url_override() {
        env::set_var("TEST_ENDPOINT", "https://putsreq.com/u10VuM9cKQSyMYbClS0F");
        let url = parse_url("TEST_ENDPOINT", DEFAULT_TRAVIS_ENDPOINT);
        assert_eq!(url.as_str(), "https://putsreq.com/u10VuM9cKQSyMYbClS0F");
        env::remove_var("TEST_ENDPOINT");
    }

    #[test]
    fn test_parse_url_invalid_falls_back() {
        env::set_var("TEST_BAD_ENDPOINT", "not a url");
        let url = parse_url("TEST_BAD_ENDPOINT", DEFAULT_TRAVIS_ENDPOINT);
        assert_eq!(url.as_str(), DEFAULT_TRAVIS_ENDPOINT);
        env::remove_var("TEST_BAD_ENDPOINT");
    }
}
