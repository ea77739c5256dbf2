use crate::constants::limits::REGEX_CACHE_CAPACITY;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static PATTERNS: Lazy<DashMap<String, Arc<Regex>>> = Lazy::new(DashMap::new);

/// Compiles `pattern` once per process; later calls reuse the compiled form.
///
/// Once the cache holds `REGEX_CACHE_CAPACITY` patterns, new ones are compiled
/// per call and not retained.
pub fn compiled(pattern: &str) -> Result<Arc<Regex>, regex::Error> {
    if let Some(hit) = PATTERNS.get(pattern) {
        return Ok(hit.value().clone());
    }
    let regex = Arc::new(Regex::new(pattern)?);
    if PATTERNS.len() < REGEX_CACHE_CAPACITY {
        PATTERNS
            .entry(pattern.to_string())
            .or_insert_with(|| regex.clone());
    }
    Ok(regex)
}

pub fn cached_len() -> usize {
    PATTERNS.len()
}

#[cfg(test)]
mod tests {
    use super::{cached_len, compiled};
    use std::sync::Arc;

    #[test]
    fn same_pattern_returns_shared_instance() {
        let first = compiled(r"^regex-cache-\d+$").unwrap();
        let second = compiled(r"^regex-cache-\d+$").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_match("regex-cache-42"));
        assert!(cached_len() >= 1);
    }

    #[test]
    fn invalid_pattern_is_an_error_and_not_cached() {
        assert!(compiled("([unclosed").is_err());
        assert!(compiled("([unclosed").is_err());
    }
}
