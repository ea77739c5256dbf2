use crate::constants::protocols::ALLOWED_HTTP;
use crate::errors::ToolError;
use url::Url;

pub fn parse_http_url(raw: &str) -> Result<Url, ToolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_params("url must be a non-empty string"));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|err| ToolError::invalid_params(format!("Invalid URL '{}': {}", trimmed, err)))?;
    if !scheme_allowed(parsed.scheme()) {
        return Err(ToolError::invalid_params(
            "Only http/https URLs are supported",
        ));
    }
    Ok(parsed)
}

fn scheme_allowed(scheme: &str) -> bool {
    let normalized = scheme.trim_end_matches(':');
    ALLOWED_HTTP
        .iter()
        .any(|allowed| allowed.trim_end_matches(':') == normalized)
}

/// Merges `params` into the query string of `url`.
///
/// A merged name replaces every existing pair with the same name; the
/// remaining pairs keep their order.
pub fn merge_query(url: &mut Url, params: &[(String, String)]) {
    if params.is_empty() {
        return;
    }
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    for (name, value) in params {
        pairs.retain(|(existing, _)| existing != name);
        pairs.push((name.clone(), value.clone()));
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// Joins a base URL and a relative path with exactly one `/` between them.
pub fn join_base_and_path(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return base_url.to_string();
    }
    if base_url.is_empty() {
        return path.to_string();
    }
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let tail = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", base, tail)
}
