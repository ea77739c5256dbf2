use crate::errors::ToolError;
use serde_json::Value;

fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut curr = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev = curr;
    }
    prev[b.len()]
}

/// Known names close to `input`, best match first.
pub fn suggest(input: &str, candidates: &[&str], limit: usize) -> Vec<String> {
    let needle = normalize_token(input);
    if needle.is_empty() {
        return Vec::new();
    }
    let allowed = (needle.len() / 3).max(1);
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .filter_map(|candidate| {
            let hay = normalize_token(candidate);
            let score = if hay.contains(&needle) || needle.contains(&hay) {
                0
            } else {
                edit_distance(&needle, &hay)
            };
            (score <= allowed).then_some((score, *candidate))
        })
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(_, name)| name.to_string())
        .collect()
}

pub fn unknown_action_error(
    tool: &str,
    action: Option<&Value>,
    known_actions: &[&str],
) -> ToolError {
    let action_value = action
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let suggestions = suggest(&action_value, known_actions, 3);
    let mut hint = format!("Use one of: {}.", known_actions.join(", "));
    if !suggestions.is_empty() {
        hint = format!("Did you mean: {}? {}", suggestions.join(", "), hint);
    }
    ToolError::invalid_params(format!("Unknown {} action: {}", tool, action_value))
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_actions": known_actions,
            "did_you_mean": suggestions,
        }))
}

#[cfg(test)]
mod tests {
    use super::{suggest, unknown_action_error};

    const ACTIONS: &[&str] = &["send_request", "execute_test", "execute_suite", "evaluate_path"];

    #[test]
    fn suggests_close_action_names() {
        assert_eq!(suggest("execute_tset", ACTIONS, 3), vec!["execute_test"]);
        assert_eq!(suggest("suite", ACTIONS, 3), vec!["execute_suite"]);
        assert!(suggest("zzz", ACTIONS, 3).is_empty());
    }

    #[test]
    fn unknown_action_lists_known_actions() {
        let action = serde_json::json!("sendrequest");
        let err = unknown_action_error("http_test", Some(&action), ACTIONS);
        assert_eq!(err.message, "Unknown http_test action: sendrequest");
        let hint = err.hint.unwrap_or_default();
        assert!(hint.starts_with("Did you mean: send_request?"));
    }
}
