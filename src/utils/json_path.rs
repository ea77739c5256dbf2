//! Restricted JSONPath evaluation.
//!
//! Supported: an optional `$` root marker, dotted property access, a single
//! bracketed index per segment (`items[0]`), and a terminal `length`
//! pseudo-property on arrays. Anything unresolvable evaluates to `Null`.

use crate::utils::path_value::PathValue;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Property(&'a str),
    Indexed { property: &'a str, index: Option<usize> },
    Length,
}

fn parse_segment(raw: &str) -> Segment<'_> {
    if let Some(open) = raw.find('[') {
        if let Some(close_rel) = raw[open..].find(']') {
            let close = open + close_rel;
            // One index per segment; trailing text such as `[0]x` or `[0][1]` never resolves.
            let index = if raw[close + 1..].is_empty() {
                raw[open + 1..close].trim().parse::<usize>().ok()
            } else {
                None
            };
            return Segment::Indexed {
                property: &raw[..open],
                index,
            };
        }
    }
    if raw.eq_ignore_ascii_case("length") {
        return Segment::Length;
    }
    Segment::Property(raw)
}

fn strip_root(path: &str) -> &str {
    let trimmed = path.trim();
    let without_dollar = trimmed.strip_prefix('$').unwrap_or(trimmed);
    without_dollar.trim_start_matches('.')
}

pub fn evaluate_path(document: &Value, path: &str) -> PathValue {
    let expression = strip_root(path);
    if expression.is_empty() {
        return PathValue::from_json(document);
    }

    let segments: Vec<&str> = expression.split('.').collect();
    let mut current = document;
    for (position, raw) in segments.iter().enumerate() {
        let is_last = position + 1 == segments.len();
        match parse_segment(raw) {
            Segment::Indexed { property, index } => {
                if !property.is_empty() {
                    match current.as_object().and_then(|obj| obj.get(property)) {
                        Some(next) => current = next,
                        None => return PathValue::Null,
                    }
                }
                let Some(index) = index else {
                    return PathValue::Null;
                };
                match current.as_array().and_then(|items| items.get(index)) {
                    Some(next) => current = next,
                    None => return PathValue::Null,
                }
            }
            Segment::Length if current.is_array() => {
                // `length` is terminal; nothing may follow it.
                if !is_last {
                    return PathValue::Null;
                }
                let count = current.as_array().map(Vec::len).unwrap_or(0);
                return PathValue::Int(count as i64);
            }
            Segment::Length | Segment::Property(_) => {
                let name = *raw;
                match current.as_object().and_then(|obj| obj.get(name)) {
                    Some(next) => current = next,
                    None => return PathValue::Null,
                }
            }
        }
    }
    PathValue::from_json(current)
}
