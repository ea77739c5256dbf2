use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

const DEFAULT_REDACTION: &str = "[REDACTED]";

static SENSITIVE_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "password",
        "passphrase",
        "secret",
        "token",
        "api_key",
        "apikey",
        "access_token",
        "auth_token",
        "client_secret",
        "refresh_token",
        "signature",
        "sig",
    ]
    .into_iter()
    .collect()
});

static SENSITIVE_HEADER_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "authorization",
        "proxy-authorization",
        "cookie",
        "set-cookie",
        "x-api-key",
        "x-auth-token",
        "x-access-token",
    ]
    .into_iter()
    .collect()
});

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = normalize_key(key);
    if normalized.is_empty() {
        return false;
    }
    if SENSITIVE_KEYS.contains(normalized.as_str()) {
        return true;
    }
    normalized.contains("secret") || normalized.contains("token")
}

/// `extra` names headers that carry credentials for this request only (api-key auth).
pub fn is_sensitive_header(name: &str, extra: &[String]) -> bool {
    let normalized = normalize_key(name);
    SENSITIVE_HEADER_KEYS.contains(normalized.as_str())
        || extra.iter().any(|e| normalize_key(e) == normalized)
}

pub fn redact_headers(headers: &[(String, String)], extra: &[String]) -> Value {
    let mut out = serde_json::Map::new();
    for (name, value) in headers {
        let rendered = if is_sensitive_header(name, extra) {
            DEFAULT_REDACTION.to_string()
        } else {
            value.clone()
        };
        out.insert(name.clone(), Value::String(rendered));
    }
    Value::Object(out)
}

/// Masks the userinfo password and sensitive query parameters of a URL.
pub fn redact_url(url: &Url) -> String {
    let mut out = url.clone();
    if out.password().is_some() {
        let _ = out.set_password(Some(DEFAULT_REDACTION));
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if is_sensitive_key(&k) {
                (k.into_owned(), DEFAULT_REDACTION.to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    if !pairs.is_empty() {
        out.query_pairs_mut().clear().extend_pairs(pairs);
    }
    out.to_string()
}
