use crate::config::{clamp_timeout_seconds, EngineDefaults};
use crate::constants::http::{BODY_METHODS, DEFAULT_CONTENT_TYPE};
use crate::errors::ToolError;
use crate::services::auth::{AuthConfig, AuthDispatch, AuthKind, AuthStrategyRegistry};
use crate::services::logger::Logger;
use crate::services::transport::{HttpTransport, PreparedRequest, TransportError, TransportResponse};
use crate::utils::args::{bool_field, json_param, str_field, string_pairs, u64_field};
use crate::utils::http_url::{merge_query, parse_http_url};
use crate::utils::redact::{redact_headers, redact_url};
use crate::utils::text::is_blank;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything needed to issue one request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: String,
    pub url: String,
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub query_params: Vec<(String, String)>,
    pub auth: Option<AuthConfig>,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
    pub validate_ssl: bool,
}

impl RequestSpec {
    pub fn new(method: &str, url: &str) -> Self {
        let defaults = EngineDefaults::default();
        Self {
            method: method.to_string(),
            url: url.to_string(),
            body: None,
            content_type: None,
            headers: Vec::new(),
            query_params: Vec::new(),
            auth: None,
            timeout_seconds: defaults.timeout_seconds,
            follow_redirects: defaults.follow_redirects,
            validate_ssl: defaults.validate_ssl,
        }
    }

    /// Reads a request from tool arguments; `url` is required.
    pub fn from_args(args: &Value, defaults: &EngineDefaults) -> Result<Self, ToolError> {
        let url = str_field(args, "url")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ToolError::invalid_params("url is required"))?;
        Self::parse(args, url, defaults)
    }

    /// Reads every request field except the URL, which the caller resolved.
    pub fn parse(args: &Value, url: String, defaults: &EngineDefaults) -> Result<Self, ToolError> {
        let method = str_field(args, "method").unwrap_or_else(|| "GET".to_string());
        let headers = match json_param(args, "headers")? {
            Some(value) => string_pairs(&value, "headers")?,
            None => Vec::new(),
        };
        let query_params = match json_param(args, "query_params")? {
            Some(value) => string_pairs(&value, "query_params")?,
            None => Vec::new(),
        };
        let auth = match json_param(args, "auth")? {
            Some(value) => Some(AuthConfig::from_value(&value)?),
            None => None,
        };
        let body = match crate::utils::args::present(args, "body") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        };
        Ok(Self {
            method,
            url,
            body,
            content_type: str_field(args, "content_type"),
            headers,
            query_params,
            auth,
            timeout_seconds: u64_field(args, "timeout_seconds")?
                .unwrap_or(defaults.timeout_seconds),
            follow_redirects: bool_field(args, "follow_redirects")?
                .unwrap_or(defaults.follow_redirects),
            validate_ssl: bool_field(args, "validate_ssl")?.unwrap_or(defaults.validate_ssl),
        })
    }
}

/// One fully-read response. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub elapsed_ms: i64,
    pub content_length: i64,
    pub content_type: String,
    pub is_success: bool,
    pub timestamp: DateTime<Utc>,
}

impl ResponseSnapshot {
    pub fn from_transport(response: TransportResponse, elapsed: Duration) -> Self {
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers {
            headers.insert(name, value);
        }
        let lookup = |name: &str| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone())
        };
        let content_type = lookup("content-type").unwrap_or_default();
        let content_length = lookup("content-length")
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(response.body.len() as i64);
        Self {
            status_code: response.status,
            status_text: response.status_text,
            is_success: (200..300).contains(&response.status),
            elapsed_ms: i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            content_length,
            content_type,
            headers,
            body: response.body,
            timestamp: Utc::now(),
        }
    }

    /// Exact name first, then ASCII case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.headers.get(name) {
            return Some(value.as_str());
        }
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<AuthStrategyRegistry>,
    logger: Logger,
}

impl RequestExecutor {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: Arc<AuthStrategyRegistry>,
        logger: Logger,
    ) -> Self {
        Self {
            transport,
            auth,
            logger: logger.child("request"),
        }
    }

    /// Builds the outgoing request without sending it.
    pub fn prepare(&self, spec: &RequestSpec) -> Result<PreparedRequest, ToolError> {
        let method_name = spec.method.trim().to_uppercase();
        let method = Method::from_bytes(method_name.as_bytes()).map_err(|_| {
            ToolError::invalid_params(format!("Invalid HTTP method: {}", spec.method))
        })?;

        let mut url = parse_http_url(&spec.url)?;
        merge_query(&mut url, &spec.query_params);

        let timeout_seconds = clamp_timeout_seconds(spec.timeout_seconds);
        let mut request = PreparedRequest::new(method, url);
        request.timeout = Duration::from_secs(timeout_seconds);
        request.follow_redirects = spec.follow_redirects;
        request.validate_ssl = spec.validate_ssl;
        request.headers.extend(spec.headers.iter().cloned());

        if let Some(auth) = spec.auth.as_ref().filter(|auth| auth.kind != AuthKind::None) {
            if let AuthDispatch::Unsupported(kind) = self.auth.apply(&mut request, auth)? {
                return Err(ToolError::invalid_params(format!(
                    "Authentication type '{}' is not supported",
                    kind
                ))
                .with_hint("Use one of: None, Bearer, Basic, ApiKey, Custom."));
            }
        }

        let carries_body = BODY_METHODS.contains(&method_name.as_str());
        if carries_body && !is_blank(spec.body.as_deref()) {
            let content_type = spec
                .content_type
                .clone()
                .filter(|ct| !ct.trim().is_empty())
                .or_else(|| request.header("Content-Type").map(str::to_string))
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            request.set_header("Content-Type", &content_type);
            request.body = spec.body.clone();
        }

        Ok(request)
    }

    /// Sends one request, exactly once.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<ResponseSnapshot, ToolError> {
        let request = self.prepare(spec)?;
        let timeout = request.timeout;
        let secret_headers = spec
            .auth
            .as_ref()
            .map(AuthConfig::secret_header_names)
            .unwrap_or_default();
        let log_meta = serde_json::json!({
            "method": request.method.as_str(),
            "url": redact_url(&request.url),
            "headers": redact_headers(&request.headers, &secret_headers),
        });
        self.logger.debug("Sending request", Some(&log_meta));

        let started = Instant::now();
        let sent = tokio::time::timeout(timeout, self.transport.send(request)).await;
        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                self.logger.debug(
                    "Request failed",
                    Some(&serde_json::json!({"error": err.to_string()})),
                );
                return Err(err.into());
            }
            Err(_) => return Err(TransportError::Timeout(timeout.as_secs()).into()),
        };
        let snapshot = ResponseSnapshot::from_transport(response, started.elapsed());

        self.logger.debug(
            "Received response",
            Some(&serde_json::json!({
                "status": snapshot.status_code,
                "elapsed_ms": snapshot.elapsed_ms,
                "content_length": snapshot.content_length,
            })),
        );
        Ok(snapshot)
    }
}
