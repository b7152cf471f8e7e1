//! Shared HTTP plumbing for the REST and feed sources.
//!
//! Every source goes through [`HttpClient`] so that transport failures and
//! HTTP statuses map onto [`ProviderError`] codes the same way everywhere.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use crate::error::{ProviderError, ProviderResult};

/// A reqwest client with a fixed per-request timeout and an optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    bearer: Option<String>,
}

impl HttpClient {
    /// Builds a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("calengine/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            inner,
            bearer: None,
        })
    }

    /// Authenticates every request with `token`.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// GETs `url` with `query` and returns the body as text.
    pub async fn get_text(&self, url: &str, query: &[(&str, String)]) -> ProviderResult<String> {
        let mut request = self.inner.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(ref token) = self.bearer {
            request = request.bearer_auth(token);
        }

        trace!(url = %url, "sending request");

        let response = request.send().await.map_err(map_send_error)?;
        read_body(response).await
    }

    /// GETs `url` with `query` and decodes the JSON body.
    pub async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> ProviderResult<T>
    where
        T: DeserializeOwned,
    {
        let body = self.get_text(url, query).await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })
    }
}

fn map_send_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout("request timeout").with_source(error)
    } else if error.is_connect() {
        ProviderError::network(format!("connection failed: {}", error)).with_source(error)
    } else {
        ProviderError::network(format!("request failed: {}", error)).with_source(error)
    }
}

async fn read_body(response: Response) -> ProviderResult<String> {
    let status = response.status();
    trace!(status = %status, "received response");

    if status.is_success() {
        return response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::timeout("timed out reading response body")
            } else {
                ProviderError::network(format!("failed to read response: {}", e))
            }
        });
    }

    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    Err(status_error(status, retry_after, &body))
}

/// Maps a non-success status onto a provider error.
pub(crate) fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )),
        StatusCode::UNAUTHORIZED => ProviderError::authentication("access token expired or invalid"),
        StatusCode::FORBIDDEN => ProviderError::authorization("access denied"),
        StatusCode::NOT_FOUND => ProviderError::not_found("resource not found"),
        StatusCode::BAD_REQUEST => ProviderError::bad_request(format!("bad request: {}", body)),
        s if s.is_server_error() => ProviderError::server(format!("API error ({}): {}", s, body)),
        s => {
            warn!(status = %s, body = %body, "unexpected response status");
            ProviderError::invalid_response(format!("unexpected status {}: {}", s, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn rate_limit_mentions_retry_after() {
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, Some(30), "");
        assert_eq!(err.code(), ProviderErrorCode::RateLimited);
        assert_eq!(err.message(), "rate limit exceeded, retry after 30 seconds");

        let bare = status_error(StatusCode::TOO_MANY_REQUESTS, None, "");
        assert_eq!(bare.message(), "rate limit exceeded");
    }

    #[test]
    fn auth_statuses_are_permanent() {
        let unauthorized = status_error(StatusCode::UNAUTHORIZED, None, "");
        let forbidden = status_error(StatusCode::FORBIDDEN, None, "");
        assert_eq!(unauthorized.code(), ProviderErrorCode::Authentication);
        assert_eq!(forbidden.code(), ProviderErrorCode::Authorization);
        assert!(!unauthorized.is_retryable());
        assert!(!forbidden.is_retryable());
    }

    #[test]
    fn server_errors_are_transient_and_keep_body() {
        let err = status_error(StatusCode::BAD_GATEWAY, None, "upstream down");
        assert_eq!(err.code(), ProviderErrorCode::Server);
        assert!(err.message().contains("upstream down"));
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_map_to_specific_codes() {
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, None, "").code(),
            ProviderErrorCode::NotFound
        );
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, None, "bad").code(),
            ProviderErrorCode::BadRequest
        );
        assert_eq!(
            status_error(StatusCode::IM_A_TEAPOT, None, "").code(),
            ProviderErrorCode::InvalidResponse
        );
    }

    #[test]
    fn client_builds_with_timeout() {
        let client = HttpClient::new(Duration::from_secs(5)).unwrap().with_bearer("tok");
        assert_eq!(client.bearer.as_deref(), Some("tok"));
    }
}
