//! Validators over the raw response body.
//!
//! `target` is ignored. `operator` may be blank, `equals` or `contains`; the
//! validator kind alone decides the check.

use super::compare::{expected_text, present_expected, resolve_operator, Operator};
use super::{ValidationOutcome, ValidationRule, Validator};
use crate::errors::ToolError;
use crate::services::request_executor::ResponseSnapshot;
use crate::utils::regex_cache;
use crate::utils::text::body_preview;
use serde_json::Value;

const OPERATORS: &[Operator] = &[Operator::Equals, Operator::Contains];

/// Operator is optional for body rules; a blank one defaults to the kind's check.
fn check_operator(kind: &str, rule: &ValidationRule) -> Result<(), ToolError> {
    if rule.operator.trim().is_empty() {
        return Ok(());
    }
    resolve_operator(kind, &rule.operator, OPERATORS).map(|_| ())
}

fn expected_or_fail(rule: &ValidationRule) -> Result<String, ValidationOutcome> {
    present_expected(&rule.expected)
        .map(expected_text)
        .ok_or_else(|| ValidationOutcome::failed(rule, "Expected value is required"))
}

fn finish(rule: &ValidationRule, passed: bool, pass: String, fail: String, body: &str) -> ValidationOutcome {
    if passed {
        ValidationOutcome::new(rule, true, pass)
    } else {
        ValidationOutcome::new(rule, false, fail).with_actual(Value::String(body_preview(body)))
    }
}

pub struct BodyContainsValidator;

impl Validator for BodyContainsValidator {
    fn kind(&self) -> &'static str {
        "BodyContains"
    }

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        check_operator(self.kind(), rule)?;
        let expected = match expected_or_fail(rule) {
            Ok(expected) => expected,
            Err(outcome) => return Ok(outcome),
        };
        let passed = response.body.contains(&expected);
        Ok(finish(
            rule,
            passed,
            format!("Body contains '{}'", expected),
            format!("Expected body to contain '{}'", expected),
            &response.body,
        ))
    }
}

pub struct BodyEqualsValidator;

impl Validator for BodyEqualsValidator {
    fn kind(&self) -> &'static str {
        "BodyEquals"
    }

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        check_operator(self.kind(), rule)?;
        let expected = match expected_or_fail(rule) {
            Ok(expected) => expected,
            Err(outcome) => return Ok(outcome),
        };
        let passed = response.body == expected;
        Ok(finish(
            rule,
            passed,
            "Body matches expected value".to_string(),
            format!("Expected body to equal '{}'", body_preview(&expected)),
            &response.body,
        ))
    }
}

pub struct BodyRegexValidator;

impl Validator for BodyRegexValidator {
    fn kind(&self) -> &'static str {
        "BodyRegex"
    }

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        check_operator(self.kind(), rule)?;
        let pattern = match expected_or_fail(rule) {
            Ok(pattern) => pattern,
            Err(outcome) => return Ok(outcome),
        };
        let regex = match regex_cache::compiled(&pattern) {
            Ok(regex) => regex,
            Err(err) => {
                return Ok(ValidationOutcome::failed(
                    rule,
                    format!("Invalid regex pattern '{}': {}", pattern, err),
                ))
            }
        };
        let passed = regex.is_match(&response.body);
        Ok(finish(
            rule,
            passed,
            format!("Body matches pattern '{}'", pattern),
            format!("Expected body to match pattern '{}'", pattern),
            &response.body,
        ))
    }
}
