//! The HTTP transport collaborator.
//!
//! The request executor only ever talks to [`HttpTransport`]; production uses
//! [`ReqwestTransport`], tests plug in scripted doubles.

use crate::constants::network::{MAX_REDIRECTS, USER_AGENT};
use crate::errors::ToolError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for ToolError {
    fn from(err: TransportError) -> Self {
        let message = err.to_string();
        match err {
            TransportError::Timeout(_) => ToolError::timeout(message),
            TransportError::Http(_) => ToolError::transport(message),
            TransportError::InvalidRequest(_) => ToolError::invalid_params(message),
            TransportError::Other(_) => ToolError::internal(message),
        }
    }
}

/// A fully-formed outgoing request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub validate_ssl: bool,
}

impl PreparedRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(crate::constants::network::DEFAULT_TIMEOUT_SECONDS),
            follow_redirects: true,
            validate_ssl: true,
        }
    }

    /// Replaces any header with the same (case-insensitive) name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response as read off the wire, body fully drained.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport. Clients are pooled per redirect/TLS policy and
/// shared across concurrent calls.
#[derive(Clone)]
pub struct ReqwestTransport {
    clients: Arc<Mutex<HashMap<(bool, bool), Client>>>,
    max_body_bytes: usize,
}

impl ReqwestTransport {
    pub fn new(max_body_bytes: usize) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            max_body_bytes,
        }
    }

    fn client(&self, follow_redirects: bool, validate_ssl: bool) -> Result<Client, TransportError> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| TransportError::Other("HTTP client pool poisoned".to_string()))?;
        if let Some(client) = clients.get(&(follow_redirects, validate_ssl)) {
            return Ok(client.clone());
        }
        let policy = if follow_redirects {
            reqwest::redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            reqwest::redirect::Policy::none()
        };
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(policy)
            .danger_accept_invalid_certs(!validate_ssl)
            .build()
            .map_err(|err| TransportError::Other(format!("Failed to build HTTP client: {}", err)))?;
        clients.insert((follow_redirects, validate_ssl), client.clone());
        Ok(client)
    }
}

fn to_header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("Invalid header name: {}", key)))?;
        let val = HeaderValue::from_str(value).map_err(|_| {
            TransportError::InvalidRequest(format!("Invalid value for header {}", key))
        })?;
        map.append(name, val);
    }
    Ok(map)
}

/// Non-ASCII values are decoded lossily rather than dropped.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout(timeout.as_secs());
    }
    TransportError::Http(err.to_string())
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        let client = self.client(request.follow_redirects, request.validate_ssl)?;
        let headers = to_header_map(&request.headers)?;
        let timeout = request.timeout;

        let mut req = client
            .request(request.method, request.url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, timeout))?;
        let status = response.status();
        let headers = header_pairs(response.headers());

        let mut buffer = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(err, timeout))?;
            let remaining = self.max_body_bytes.saturating_sub(buffer.len());
            if chunk.len() > remaining {
                buffer.extend_from_slice(&chunk[..remaining]);
                break;
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: String::from_utf8_lossy(&buffer).into_owned(),
        })
    }
}
