use super::compare::{compare_numbers, expected_integer, present_expected, resolve_operator, Operator};
use super::{ValidationOutcome, ValidationRule, Validator};
use crate::errors::ToolError;
use crate::services::request_executor::ResponseSnapshot;
use serde_json::Value;

const OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThanOrEqual,
];

pub struct StatusCodeValidator;

impl Validator for StatusCodeValidator {
    fn kind(&self) -> &'static str {
        "StatusCode"
    }

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        let op = resolve_operator(self.kind(), &rule.operator, OPERATORS)?;
        let actual = i64::from(response.status_code);
        let Some(expected) = present_expected(&rule.expected) else {
            return Ok(ValidationOutcome::failed(rule, "Expected value is required")
                .with_actual(Value::from(actual)));
        };
        let expected = expected_integer(expected, "status code")?;
        let passed = compare_numbers(op, actual as f64, expected as f64);
        let message = if passed {
            format!("Status code {} {} {}", actual, op.symbol(), expected)
        } else {
            format!(
                "Expected status code {} {}, but got {}",
                op.symbol(),
                expected,
                actual
            )
        };
        Ok(ValidationOutcome::new(rule, passed, message).with_actual(Value::from(actual)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::response;
    use super::*;
    use serde_json::json;

    fn check(status: u16, op: &str, expected: Value) -> Result<ValidationOutcome, ToolError> {
        let rule = ValidationRule::new("StatusCode", "", op, Some(expected));
        StatusCodeValidator.validate(&response(status, ""), &rule)
    }

    #[test]
    fn ordering_operators() {
        assert!(check(200, "greaterthanorequal", json!(200)).unwrap().passed);
        assert!(!check(200, "lessthan", json!(200)).unwrap().passed);
        assert!(check(404, "GreaterThan", json!("399")).unwrap().passed);
        assert!(check(201, "notequals", json!(200)).unwrap().passed);
    }

    #[test]
    fn failure_message_names_both_sides() {
        let outcome = check(500, "equals", json!(200)).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.message, "Expected status code == 200, but got 500");
        assert_eq!(outcome.actual, Some(json!(500)));
    }

    #[test]
    fn unknown_operator_is_an_error() {
        assert!(check(200, "contains", json!(200)).is_err());
        assert!(check(200, "approximately", json!(200)).is_err());
    }

    #[test]
    fn missing_expected_fails_softly() {
        let rule = ValidationRule::new("StatusCode", "", "equals", None);
        let outcome = StatusCodeValidator.validate(&response(200, ""), &rule).unwrap();
        assert!(!outcome.passed);
        assert!(outcome.message.contains("Expected value is required"));
    }
}
