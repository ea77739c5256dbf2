//! Authentication strategies applied to outgoing requests.

use crate::errors::ToolError;
use crate::services::transport::PreparedRequest;
use crate::utils::args::{fold_key, present, str_field, string_pairs};
use crate::utils::text::is_blank;
use base64::Engine;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AuthKind {
    #[default]
    None,
    Bearer,
    Basic,
    ApiKey,
    Custom,
    Other(String),
}

impl AuthKind {
    pub fn parse(raw: &str) -> Self {
        match fold_key(raw.trim()).as_str() {
            "" | "none" => AuthKind::None,
            "bearer" => AuthKind::Bearer,
            "basic" => AuthKind::Basic,
            "apikey" => AuthKind::ApiKey,
            "custom" => AuthKind::Custom,
            _ => AuthKind::Other(raw.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AuthKind::None => "None",
            AuthKind::Bearer => "Bearer",
            AuthKind::Basic => "Basic",
            AuthKind::ApiKey => "ApiKey",
            AuthKind::Custom => "Custom",
            AuthKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Plain credential bag. Nothing is validated until a strategy applies it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub kind: AuthKind,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub header_name: Option<String>,
    pub header_value: Option<String>,
    pub custom_headers: Option<Vec<(String, String)>>,
}

impl AuthConfig {
    pub fn from_value(value: &Value) -> Result<Self, ToolError> {
        if !value.is_object() {
            return Err(ToolError::invalid_params("auth must be a JSON object"));
        }
        let kind = str_field(value, "kind")
            .or_else(|| str_field(value, "type"))
            .map(|raw| AuthKind::parse(&raw))
            .unwrap_or_default();
        let custom_headers = match present(value, "custom_headers") {
            Some(headers) => Some(string_pairs(headers, "auth.customHeaders")?),
            None => None,
        };
        Ok(Self {
            kind,
            token: str_field(value, "token"),
            username: str_field(value, "username"),
            password: str_field(value, "password"),
            header_name: str_field(value, "header_name"),
            header_value: str_field(value, "header_value"),
            custom_headers,
        })
    }

    /// Header names this config writes that must not show up in logs.
    pub fn secret_header_names(&self) -> Vec<String> {
        match self.kind {
            AuthKind::ApiKey => self.header_name.iter().cloned().collect(),
            AuthKind::Custom => self
                .custom_headers
                .iter()
                .flatten()
                .map(|(name, _)| name.clone())
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub trait AuthStrategy: Send + Sync {
    fn kind(&self) -> AuthKind;

    /// Adds credentials to `request`. On error the request is left untouched.
    fn apply(&self, request: &mut PreparedRequest, config: &AuthConfig) -> Result<(), ToolError>;
}

fn required<'a>(value: Option<&'a String>, message: &str) -> Result<&'a str, ToolError> {
    if is_blank(value.map(String::as_str)) {
        return Err(ToolError::invalid_params(message.to_string()));
    }
    Ok(value.map(String::as_str).unwrap_or_default())
}

pub struct NoAuth;

impl AuthStrategy for NoAuth {
    fn kind(&self) -> AuthKind {
        AuthKind::None
    }

    fn apply(&self, _request: &mut PreparedRequest, _config: &AuthConfig) -> Result<(), ToolError> {
        Ok(())
    }
}

pub struct BearerAuth;

impl AuthStrategy for BearerAuth {
    fn kind(&self) -> AuthKind {
        AuthKind::Bearer
    }

    fn apply(&self, request: &mut PreparedRequest, config: &AuthConfig) -> Result<(), ToolError> {
        let token = required(config.token.as_ref(), "Bearer token is required")?;
        request.set_header("Authorization", &format!("Bearer {}", token));
        Ok(())
    }
}

pub struct BasicAuth;

impl AuthStrategy for BasicAuth {
    fn kind(&self) -> AuthKind {
        AuthKind::Basic
    }

    fn apply(&self, request: &mut PreparedRequest, config: &AuthConfig) -> Result<(), ToolError> {
        let username = required(
            config.username.as_ref(),
            "Username and password are required for Basic authentication",
        )?;
        let password = required(
            config.password.as_ref(),
            "Username and password are required for Basic authentication",
        )?;
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
        request.set_header("Authorization", &format!("Basic {}", encoded));
        Ok(())
    }
}

pub struct ApiKeyAuth;

impl AuthStrategy for ApiKeyAuth {
    fn kind(&self) -> AuthKind {
        AuthKind::ApiKey
    }

    fn apply(&self, request: &mut PreparedRequest, config: &AuthConfig) -> Result<(), ToolError> {
        let name = required(
            config.header_name.as_ref(),
            "Header name and value are required for API key authentication",
        )?;
        let value = required(
            config.header_value.as_ref(),
            "Header name and value are required for API key authentication",
        )?;
        request.set_header(name, value);
        Ok(())
    }
}

pub struct CustomHeadersAuth;

impl AuthStrategy for CustomHeadersAuth {
    fn kind(&self) -> AuthKind {
        AuthKind::Custom
    }

    fn apply(&self, request: &mut PreparedRequest, config: &AuthConfig) -> Result<(), ToolError> {
        let headers = config
            .custom_headers
            .as_ref()
            .filter(|headers| !headers.is_empty())
            .ok_or_else(|| {
                ToolError::invalid_params("Custom headers are required for Custom authentication")
            })?;
        for (name, value) in headers {
            request.set_header(name, value);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDispatch {
    Applied,
    Unsupported(AuthKind),
}

#[derive(Clone, Default)]
pub struct AuthStrategyRegistry {
    strategies: HashMap<AuthKind, Arc<dyn AuthStrategy>>,
}

impl AuthStrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(NoAuth));
        registry.register(Arc::new(BearerAuth));
        registry.register(Arc::new(BasicAuth));
        registry.register(Arc::new(ApiKeyAuth));
        registry.register(Arc::new(CustomHeadersAuth));
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn AuthStrategy>) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    /// A missing strategy is reported as `Unsupported`, not as an error; a
    /// matched strategy with a malformed config is an error.
    pub fn apply(
        &self,
        request: &mut PreparedRequest,
        config: &AuthConfig,
    ) -> Result<AuthDispatch, ToolError> {
        let Some(strategy) = self.strategies.get(&config.kind) else {
            return Ok(AuthDispatch::Unsupported(config.kind.clone()));
        };
        strategy.apply(request, config)?;
        Ok(AuthDispatch::Applied)
    }
}
