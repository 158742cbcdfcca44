//! Control protocol of the external mock server.
//!
//! The mock server is a separate process. [`MockServer`] is the seam the
//! gateway drives; [`HttpMockServer`] talks to a running server over its
//! admin endpoints:
//!
//! - `PUT /interactions` registers the interactions under test
//! - `GET /interactions/verification` reports mismatches (non-2xx body)
//! - `POST /pact?dir=<dir>` writes the contract file

use crate::error::MockServerError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const MOCK_SERVICE_HEADER: &str = "X-Pact-Mock-Service";

/// Result of asking the mock server to verify observed requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    /// Raw mismatch payload as returned by the server.
    Mismatches(String),
}

/// Setup/verify/write protocol of a mock server.
#[async_trait]
pub trait MockServer: Send + Sync {
    /// URL the consumer code under test should call.
    fn base_url(&self) -> &str;

    /// Register the interactions contained in `contract`.
    async fn setup(&self, contract: &[u8]) -> Result<(), MockServerError>;

    /// Compare observed requests against the registered interactions.
    async fn verify(&self) -> Result<VerifyOutcome, MockServerError>;

    /// Persist `contract` under `dir`, returning the written path.
    async fn write_contract(&self, contract: &[u8], dir: &Path) -> Result<String, MockServerError>;
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    path: String,
}

/// HTTP client for a mock server's admin endpoints.
///
/// The client carries no request timeout of its own; every call is bounded
/// by the caller so a per-run timeout is never cut short.
pub struct HttpMockServer {
    client: Client,
    base_url: String,
}

impl HttpMockServer {
    pub fn new(base_url: &str) -> Result<Self, MockServerError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn handle_error<T>(&self, resp: reqwest::Response) -> Result<T, MockServerError> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            format!("Request failed with status {status}")
        } else {
            body.trim().to_string()
        };
        Err(MockServerError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

fn map_send_error(base_url: &str, e: reqwest::Error) -> MockServerError {
    if e.is_connect() {
        MockServerError::Connection(format!("Cannot connect to {base_url}"))
    } else {
        MockServerError::Request(e)
    }
}

#[async_trait]
impl MockServer for HttpMockServer {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn setup(&self, contract: &[u8]) -> Result<(), MockServerError> {
        let url = format!("{}/interactions", self.base_url);
        debug!("Mock server setup: PUT {}", url);
        let resp = self
            .client
            .put(&url)
            .header(MOCK_SERVICE_HEADER, "true")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(contract.to_vec())
            .send()
            .await
            .map_err(|e| map_send_error(&self.base_url, e))?;

        if !resp.status().is_success() {
            return self.handle_error(resp).await;
        }

        Ok(())
    }

    async fn verify(&self) -> Result<VerifyOutcome, MockServerError> {
        let url = format!("{}/interactions/verification", self.base_url);
        debug!("Mock server verify: GET {}", url);
        let resp = self
            .client
            .get(&url)
            .header(MOCK_SERVICE_HEADER, "true")
            .send()
            .await
            .map_err(|e| map_send_error(&self.base_url, e))?;

        if resp.status().is_success() {
            return Ok(VerifyOutcome::Verified);
        }

        Ok(VerifyOutcome::Mismatches(resp.text().await?))
    }

    async fn write_contract(&self, contract: &[u8], dir: &Path) -> Result<String, MockServerError> {
        let dir = dir.to_string_lossy();
        let url = format!("{}/pact?dir={}", self.base_url, urlencoding::encode(&dir));
        debug!("Mock server write contract: POST {}", url);
        let resp = self
            .client
            .post(&url)
            .header(MOCK_SERVICE_HEADER, "true")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(contract.to_vec())
            .send()
            .await
            .map_err(|e| map_send_error(&self.base_url, e))?;

        if !resp.status().is_success() {
            return self.handle_error(resp).await;
        }

        let text = resp.text().await?;
        match serde_json::from_str::<WriteResponse>(&text) {
            Ok(written) => Ok(written.path),
            Err(_) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Err(_) => Ok(dir.into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let server = HttpMockServer::new("http://127.0.0.1:1234/").unwrap();
        assert_eq!(server.base_url(), "http://127.0.0.1:1234");
    }

    #[tokio::test]
    async fn test_connection_refused_is_reported() {
        // Port 9 (discard) is assumed closed on test machines
        let server = HttpMockServer::new("http://127.0.0.1:9").unwrap();
        let err = server.setup(b"{}").await.unwrap_err();
        assert!(matches!(
            err,
            MockServerError::Connection(_) | MockServerError::Request(_)
        ));
    }
}
