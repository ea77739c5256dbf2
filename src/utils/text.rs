use crate::constants::limits::BODY_PREVIEW_CHARS;

/// First `max_chars` characters of `value`, with `...` appended when anything was cut.
pub fn preview_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

pub fn body_preview(body: &str) -> String {
    preview_chars(body, BODY_PREVIEW_CHARS)
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}
