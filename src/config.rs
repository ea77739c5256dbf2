//! Caller-facing defaults for the request engine.
//!
//! The engine itself never reads the environment; the tool layer resolves these
//! once at startup and passes them down with every call.

use crate::constants::network;
use crate::utils::feature_flags::env_flag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineDefaults {
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
    pub validate_ssl: bool,
    pub max_body_bytes: usize,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            timeout_seconds: network::DEFAULT_TIMEOUT_SECONDS,
            follow_redirects: true,
            validate_ssl: true,
            max_body_bytes: network::DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl EngineDefaults {
    pub fn from_env() -> Self {
        let fallback = Self::default();
        let timeout_seconds = std::env::var("APIPROBE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(clamp_timeout_seconds)
            .unwrap_or(fallback.timeout_seconds);
        let max_body_bytes = std::env::var("APIPROBE_MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(fallback.max_body_bytes);
        Self {
            timeout_seconds,
            follow_redirects: env_flag("APIPROBE_FOLLOW_REDIRECTS", fallback.follow_redirects),
            validate_ssl: env_flag("APIPROBE_VALIDATE_SSL", fallback.validate_ssl),
            max_body_bytes,
        }
    }
}

pub fn clamp_timeout_seconds(value: u64) -> u64 {
    value.clamp(network::MIN_TIMEOUT_SECONDS, network::MAX_TIMEOUT_SECONDS)
}

pub fn resolve_tool_tier() -> String {
    let raw = std::env::var("APIPROBE_TOOL_TIER").unwrap_or_else(|_| "full".to_string());
    if raw.trim().eq_ignore_ascii_case("core") {
        "core".to_string()
    } else {
        "full".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_clamped_to_supported_window() {
        assert_eq!(clamp_timeout_seconds(0), 1);
        assert_eq!(clamp_timeout_seconds(45), 45);
        assert_eq!(clamp_timeout_seconds(10_000), 600);
    }

    #[test]
    fn defaults_follow_redirects_and_validate_ssl() {
        let defaults = EngineDefaults::default();
        assert!(defaults.follow_redirects);
        assert!(defaults.validate_ssl);
        assert_eq!(defaults.timeout_seconds, 30);
    }
}
