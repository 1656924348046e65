//! Blocking reqwest transport

use std::time::{Duration, Instant};

use routecheck_core::transport::{HttpRequest, HttpResponse, Method, Transport};
use routecheck_core::{Config, ContractError};

use crate::runner::RunnerError;

/// Query parameter carrying the API key.
const KEY_PARAM: &str = "key";

/// `Transport` over one pooled `reqwest::blocking::Client`.
///
/// Every request gets `key=<api_key>` appended unless the caller already set
/// one.
pub struct HttpClient {
    inner: reqwest::blocking::Client,
    api_key: String,
    timeout: Duration,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, RunnerError> {
        Self::new(config.api_key.clone(), config.timeout())
    }

    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, RunnerError> {
        let inner = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RunnerError::Http(e.to_string()))?;
        Ok(Self {
            inner,
            api_key: api_key.into(),
            timeout,
        })
    }

    fn map_error(&self, url: &str, e: &reqwest::Error) -> ContractError {
        if e.is_timeout() {
            ContractError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ContractError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

impl Transport for HttpClient {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ContractError> {
        let mut req = match request.method {
            Method::Get => self.inner.get(&request.url),
            Method::Post => self.inner.post(&request.url),
        };
        for (k, v) in &request.query {
            req = req.query(&[(k, v)]);
        }
        if !request.query.iter().any(|(k, _)| k == KEY_PARAM) {
            req = req.query(&[(KEY_PARAM, self.api_key.as_str())]);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let start = Instant::now();
        let resp = req.send().map_err(|e| self.map_error(&request.url, &e))?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| self.map_error(&request.url, &e))?;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status,
            elapsed_ms,
            bytes = body.len(),
            "response received"
        );

        Ok(HttpResponse {
            status,
            body,
            elapsed_ms,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_refused_is_transport_error() {
        // Port 9 (discard) on loopback is closed on test machines.
        let client = HttpClient::new("k", Duration::from_secs(2)).unwrap();
        let err = client
            .send(&HttpRequest::get("http://127.0.0.1:9/items"))
            .unwrap_err();
        assert_eq!(err.kind(), routecheck_core::FailureKind::Transport);
    }

    #[test]
    fn debug_hides_key() {
        let client = HttpClient::new("secret", Duration::from_secs(1)).unwrap();
        assert!(!format!("{client:?}").contains("secret"));
    }
}
