//! Operator table and comparison helpers shared by the validators.

use crate::errors::ToolError;
use crate::utils::args::fold_key;
use crate::utils::path_value::PathValue;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Exists,
    NotExists,
    Contains,
}

impl Operator {
    /// Case-insensitive; `_`, `-` and spaces are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = fold_key(raw).chars().filter(|c| !c.is_whitespace()).collect();
        let op = match folded.as_str() {
            "equals" => Operator::Equals,
            "notequals" => Operator::NotEquals,
            "greaterthan" => Operator::GreaterThan,
            "lessthan" => Operator::LessThan,
            "greaterthanorequal" => Operator::GreaterThanOrEqual,
            "lessthanorequal" => Operator::LessThanOrEqual,
            "exists" => Operator::Exists,
            "notexists" => Operator::NotExists,
            "contains" => Operator::Contains,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notequals",
            Operator::GreaterThan => "greaterthan",
            Operator::LessThan => "lessthan",
            Operator::GreaterThanOrEqual => "greaterthanorequal",
            Operator::LessThanOrEqual => "lessthanorequal",
            Operator::Exists => "exists",
            Operator::NotExists => "notexists",
            Operator::Contains => "contains",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Exists => "exists",
            Operator::NotExists => "not exists",
            Operator::Contains => "contains",
        }
    }
}

/// Resolves `raw` against the operators a validator supports.
pub fn resolve_operator(
    validator: &str,
    raw: &str,
    supported: &[Operator],
) -> Result<Operator, ToolError> {
    match Operator::parse(raw) {
        Some(op) if supported.contains(&op) => Ok(op),
        _ => {
            let names: Vec<&str> = supported.iter().map(|op| op.name()).collect();
            Err(ToolError::invalid_params(format!(
                "Unknown operator '{}' for {} validation",
                raw, validator
            ))
            .with_hint(format!("Supported operators: {}.", names.join(", "))))
        }
    }
}

/// Applies an equality or ordering operator to two numbers.
pub fn compare_numbers(op: Operator, actual: f64, expected: f64) -> bool {
    match op {
        Operator::Equals => actual == expected,
        Operator::NotEquals => actual != expected,
        Operator::GreaterThan => actual > expected,
        Operator::LessThan => actual < expected,
        Operator::GreaterThanOrEqual => actual >= expected,
        Operator::LessThanOrEqual => actual <= expected,
        Operator::Exists | Operator::NotExists | Operator::Contains => false,
    }
}

/// Numeric when both sides are numbers, text forms otherwise.
pub fn loosely_equal(actual: &PathValue, expected: &PathValue) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => actual.to_text() == expected.to_text(),
    }
}

/// Reads an integral expected value: integer, integral float or numeric text.
pub fn expected_integer(value: &Value, label: &str) -> Result<i64, ToolError> {
    let parsed = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    };
    parsed.ok_or_else(|| {
        ToolError::invalid_params(format!(
            "Expected {} must be an integer, got {}",
            label, value
        ))
    })
}

/// Expected value as comparison text.
pub fn expected_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => PathValue::from_json(other).to_text(),
    }
}

pub fn present_expected(expected: &Option<Value>) -> Option<&Value> {
    expected.as_ref().filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operators_parse_loosely() {
        assert_eq!(Operator::parse("GreaterThanOrEqual"), Some(Operator::GreaterThanOrEqual));
        assert_eq!(Operator::parse("not_equals"), Some(Operator::NotEquals));
        assert_eq!(Operator::parse("LESSTHAN"), Some(Operator::LessThan));
        assert_eq!(Operator::parse("between"), None);
    }

    #[test]
    fn unsupported_operator_is_an_error() {
        let err = resolve_operator("StatusCode", "contains", &[Operator::Equals]).unwrap_err();
        assert!(err.message.contains("Unknown operator 'contains'"));
    }

    #[test]
    fn numeric_equality_ignores_representation() {
        assert!(loosely_equal(&PathValue::Int(30), &PathValue::Float(30.0)));
        assert!(loosely_equal(
            &PathValue::String("abc".to_string()),
            &PathValue::String("abc".to_string())
        ));
        assert!(!loosely_equal(&PathValue::Int(1), &PathValue::String("1.0".to_string())));
    }

    #[test]
    fn expected_integer_accepts_integral_forms() {
        assert_eq!(expected_integer(&json!(200), "status").unwrap(), 200);
        assert_eq!(expected_integer(&json!(200.0), "status").unwrap(), 200);
        assert_eq!(expected_integer(&json!(" 404 "), "status").unwrap(), 404);
        assert!(expected_integer(&json!(200.5), "status").is_err());
        assert!(expected_integer(&json!("ok"), "status").is_err());
        assert!(expected_integer(&json!(true), "status").is_err());
    }
}
