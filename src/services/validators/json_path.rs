use super::compare::{compare_numbers, loosely_equal, present_expected, resolve_operator, Operator};
use super::{ValidationOutcome, ValidationRule, Validator};
use crate::errors::ToolError;
use crate::services::request_executor::ResponseSnapshot;
use crate::utils::json_path::evaluate_path;
use crate::utils::path_value::PathValue;
use serde_json::Value;

const OPERATORS: &[Operator] = &[
    Operator::Exists,
    Operator::NotExists,
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThanOrEqual,
];

pub struct JsonPathValidator;

impl JsonPathValidator {
    fn contains(actual: &PathValue, expected: &PathValue) -> bool {
        match actual {
            PathValue::List(items) => items.iter().any(|item| loosely_equal(item, expected)),
            PathValue::Null => false,
            other => other.to_text().contains(&expected.to_text()),
        }
    }
}

impl Validator for JsonPathValidator {
    fn kind(&self) -> &'static str {
        "JsonPath"
    }

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        let op = resolve_operator(self.kind(), &rule.operator, OPERATORS)?;
        let path = rule.target.trim();
        if path.is_empty() {
            return Ok(ValidationOutcome::failed(
                rule,
                "JSON path is required in target",
            ));
        }
        let document: Value = match serde_json::from_str(&response.body) {
            Ok(document) => document,
            Err(err) => {
                return Ok(ValidationOutcome::failed(
                    rule,
                    format!("Failed to parse JSON: {}", err),
                ))
            }
        };
        let actual = evaluate_path(&document, path);
        let expected = present_expected(&rule.expected).map(PathValue::from_json);

        let passed = match op {
            Operator::Exists => !actual.is_null(),
            Operator::NotExists => actual.is_null(),
            Operator::Equals | Operator::NotEquals => {
                let expected = expected.clone().unwrap_or(PathValue::Null);
                loosely_equal(&actual, &expected) == (op == Operator::Equals)
            }
            Operator::Contains => match expected.as_ref() {
                Some(expected) => Self::contains(&actual, expected),
                None => {
                    return Ok(ValidationOutcome::failed(rule, "Expected value is required")
                        .with_actual(actual.to_json()))
                }
            },
            _ => {
                let Some(expected) = expected.as_ref() else {
                    return Ok(ValidationOutcome::failed(rule, "Expected value is required")
                        .with_actual(actual.to_json()));
                };
                match (actual.as_f64(), expected.as_f64()) {
                    (Some(a), Some(b)) => compare_numbers(op, a, b),
                    _ => {
                        return Err(ToolError::invalid_params(format!(
                            "Cannot apply '{}' to non-numeric values at '{}': {} and {}",
                            op.name(),
                            path,
                            actual.type_name(),
                            expected.type_name()
                        )))
                    }
                }
            }
        };

        let message = match (op, passed) {
            (Operator::Exists, true) => format!("Path '{}' exists", path),
            (Operator::Exists, false) => format!("Path '{}' not found", path),
            (Operator::NotExists, true) => format!("Path '{}' does not exist", path),
            (Operator::NotExists, false) => {
                format!("Expected path '{}' not to exist, but found {}", path, actual)
            }
            (_, true) => format!(
                "Path '{}' {} {}",
                path,
                op.symbol(),
                expected.as_ref().map(PathValue::to_text).unwrap_or_else(|| "null".to_string())
            ),
            (_, false) => format!(
                "Expected '{}' {} {}, but got {}",
                path,
                op.symbol(),
                expected.as_ref().map(PathValue::to_text).unwrap_or_else(|| "null".to_string()),
                actual
            ),
        };
        Ok(ValidationOutcome::new(rule, passed, message).with_actual(actual.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::response;
    use super::*;
    use serde_json::json;

    const BODY: &str = r#"{"user":{"id":30,"name":"Ana","tags":["admin","ops"],"score":4.5},"items":[1,2,3]}"#;

    fn check(body: &str, target: &str, op: &str, expected: Option<Value>) -> Result<ValidationOutcome, ToolError> {
        let rule = ValidationRule::new("JsonPath", target, op, expected);
        JsonPathValidator.validate(&response(200, body), &rule)
    }

    #[test]
    fn equality_is_numeric_when_both_sides_are_numbers() {
        assert!(check(BODY, "$.user.id", "equals", Some(json!(30.0))).unwrap().passed);
        assert!(check(BODY, "$.user.name", "equals", Some(json!("Ana"))).unwrap().passed);
        assert!(check(BODY, "$.user.name", "notequals", Some(json!("Bob"))).unwrap().passed);
        assert!(!check(BODY, "$.user.id", "equals", Some(json!("30.0"))).unwrap().passed);
    }

    #[test]
    fn existence_checks() {
        assert!(check(BODY, "$.user.tags", "exists", None).unwrap().passed);
        assert!(check(BODY, "$.user.email", "notexists", None).unwrap().passed);
        let outcome = check(BODY, "$.user.email", "exists", None).unwrap();
        assert_eq!(outcome.message, "Path '$.user.email' not found");
    }

    #[test]
    fn contains_on_lists_and_text() {
        assert!(check(BODY, "$.user.tags", "contains", Some(json!("ops"))).unwrap().passed);
        assert!(check(BODY, "$.items", "contains", Some(json!(2.0))).unwrap().passed);
        assert!(check(BODY, "$.user.name", "contains", Some(json!("An"))).unwrap().passed);
        assert!(!check(BODY, "$.user.tags", "contains", Some(json!("adm"))).unwrap().passed);
    }

    #[test]
    fn ordering_requires_numbers() {
        assert!(check(BODY, "$.items.length", "greaterthanorequal", Some(json!(3))).unwrap().passed);
        assert!(check(BODY, "$.user.score", "lessthan", Some(json!(5))).unwrap().passed);
        assert!(check(BODY, "$.user.name", "greaterthan", Some(json!(1))).is_err());
        assert!(check(BODY, "$.user.id", "greaterthan", Some(json!("10"))).is_err());
    }

    #[test]
    fn invalid_json_body_is_a_failed_outcome() {
        let outcome = check("invalid json", "$.id", "exists", None).unwrap();
        assert!(!outcome.passed);
        assert!(outcome.message.contains("Failed to parse JSON"));
    }

    #[test]
    fn blank_target_fails_before_parsing() {
        let outcome = check("invalid json", "", "equals", Some(json!(1))).unwrap();
        assert!(!outcome.passed);
        assert!(outcome.message.contains("required"));
        assert!(!outcome.message.contains("parse"));
    }

    #[test]
    fn unknown_operator_is_an_error() {
        assert!(check(BODY, "$.user.id", "matches", Some(json!(1))).is_err());
    }

    #[test]
    fn objects_compare_as_text() {
        let outcome = check(r#"{"a":{"b":1}}"#, "$.a", "equals", Some(json!("{\"b\":1}"))).unwrap();
        assert!(outcome.passed);
    }
}
