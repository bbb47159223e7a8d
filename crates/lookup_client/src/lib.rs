use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use shared::{
    error::LookupError,
    protocol::{decode_lookup_body, LookupRequest, LookupResult},
};
use tracing::debug;

const MAX_LOGGED_BODY_CHARS: usize = 200;

/// Performs one remote lookup. Implementations never retry and never cancel:
/// each call resolves exactly once with fields, an application error, or a
/// transport error.
#[async_trait]
pub trait LookupTransport: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> LookupResult;
}

/// Transport used when no lookup backend is wired in.
pub struct UnavailableLookupTransport;

#[async_trait]
impl LookupTransport for UnavailableLookupTransport {
    async fn lookup(&self, request: &LookupRequest) -> LookupResult {
        Err(LookupError::transport(
            request.kind,
            format!("lookup backend unavailable for {}", request.endpoint),
        ))
    }
}

#[derive(Clone, Default)]
pub struct HttpLookupTransport {
    http: Client,
}

impl HttpLookupTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Bounds each request by `timeout`; without it only the OS limits apply.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

fn body_excerpt(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(MAX_LOGGED_BODY_CHARS)
        .collect()
}

#[async_trait]
impl LookupTransport for HttpLookupTransport {
    async fn lookup(&self, request: &LookupRequest) -> LookupResult {
        let kind = request.kind;
        debug!(kind = kind.name(), endpoint = %request.endpoint, "sending lookup request");

        let response = self
            .http
            .get(&request.endpoint)
            .query(&request.query_pairs())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                LookupError::transport(kind, format!("request to {} failed: {e}", request.endpoint))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            LookupError::transport(kind, format!("failed to read {kind} lookup body: {e}"))
        })?;

        if !status.is_success() {
            return Err(LookupError::transport(
                kind,
                format!("HTTP {status} from {}: {}", request.endpoint, body_excerpt(&body)),
            ));
        }

        decode_lookup_body(kind, &body)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
