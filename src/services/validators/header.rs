use super::compare::{expected_text, present_expected, resolve_operator, Operator};
use super::{ValidationOutcome, ValidationRule, Validator};
use crate::errors::ToolError;
use crate::services::request_executor::ResponseSnapshot;
use serde_json::Value;

const OPERATORS: &[Operator] = &[
    Operator::Exists,
    Operator::NotExists,
    Operator::Equals,
    Operator::Contains,
    Operator::NotEquals,
];

pub struct HeaderValidator;

impl Validator for HeaderValidator {
    fn kind(&self) -> &'static str {
        "Header"
    }

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        let op = resolve_operator(self.kind(), &rule.operator, OPERATORS)?;
        let name = rule.target.trim();
        if name.is_empty() {
            return Ok(ValidationOutcome::failed(
                rule,
                "Header name is required in target",
            ));
        }
        let actual = response.header(name);
        let actual_json = actual.map(Value::from).unwrap_or(Value::Null);

        match op {
            Operator::Exists | Operator::NotExists => {
                let wanted = op == Operator::Exists;
                let passed = actual.is_some() == wanted;
                let message = match (passed, wanted) {
                    (true, true) | (false, false) => format!("Header '{}' is present", name),
                    (true, false) | (false, true) => format!("Header '{}' is not present", name),
                };
                return Ok(ValidationOutcome::new(rule, passed, message).with_actual(actual_json));
            }
            _ => {}
        }

        let Some(expected) = present_expected(&rule.expected) else {
            return Ok(ValidationOutcome::failed(rule, "Expected value is required")
                .with_actual(actual_json));
        };
        let expected = expected_text(expected);
        let Some(actual) = actual else {
            let passed = op == Operator::NotEquals;
            let message = if passed {
                format!("Header '{}' is not present", name)
            } else {
                format!("Header '{}' not found", name)
            };
            return Ok(ValidationOutcome::new(rule, passed, message).with_actual(actual_json));
        };

        let passed = match op {
            Operator::Equals => actual == expected,
            Operator::NotEquals => actual != expected,
            _ => actual.contains(&expected),
        };
        let message = if passed {
            format!("Header '{}' {} '{}'", name, op.symbol(), expected)
        } else {
            format!(
                "Expected header '{}' {} '{}', but got '{}'",
                name,
                op.symbol(),
                expected,
                actual
            )
        };
        Ok(ValidationOutcome::new(rule, passed, message).with_actual(actual_json))
    }
}
