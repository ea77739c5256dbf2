use super::compare::{compare_numbers, expected_integer, present_expected, resolve_operator, Operator};
use super::{ValidationOutcome, ValidationRule, Validator};
use crate::errors::ToolError;
use crate::services::request_executor::ResponseSnapshot;
use serde_json::Value;

const OPERATORS: &[Operator] = &[
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::Equals,
];

pub struct ResponseTimeValidator;

impl Validator for ResponseTimeValidator {
    fn kind(&self) -> &'static str {
        "ResponseTime"
    }

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        let op = resolve_operator(self.kind(), &rule.operator, OPERATORS)?;
        let actual = response.elapsed_ms;
        let Some(expected) = present_expected(&rule.expected) else {
            return Ok(ValidationOutcome::failed(rule, "Expected value is required")
                .with_actual(Value::from(actual)));
        };
        let expected = expected_integer(expected, "response time")?;
        let passed = compare_numbers(op, actual as f64, expected as f64);
        let message = if passed {
            format!("Response time {}ms {} {}ms", actual, op.symbol(), expected)
        } else {
            format!(
                "Expected response time {} {}ms, but got {}ms",
                op.symbol(),
                expected,
                actual
            )
        };
        Ok(ValidationOutcome::new(rule, passed, message).with_actual(Value::from(actual)))
    }
}
