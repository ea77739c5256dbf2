pub fn is_truthy(value: impl AsRef<str>) -> bool {
    matches!(
        value.as_ref().trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn is_falsy(value: impl AsRef<str>) -> bool {
    matches!(
        value.as_ref().trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Reads a boolean env flag; unset or unrecognized values keep `default`.
pub fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) if is_truthy(&raw) => true,
        Ok(raw) if is_falsy(&raw) => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_falsy, is_truthy};

    #[test]
    fn truthy_and_falsy_words() {
        assert!(is_truthy(" Yes "));
        assert!(is_truthy("1"));
        assert!(!is_truthy("maybe"));
        assert!(is_falsy("OFF"));
        assert!(!is_falsy(""));
    }
}
