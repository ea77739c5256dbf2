//! Response validators and the registry that dispatches rules to them.
//!
//! Every validator is total over known operators: a data problem (unparseable
//! body, bad regex, missing expected value) becomes a failed
//! [`ValidationOutcome`]. An operator the validator does not know is a
//! [`ToolError`].

mod body;
mod compare;
mod header;
mod json_path;
mod response_time;
mod status_code;

pub use body::{BodyContainsValidator, BodyEqualsValidator, BodyRegexValidator};
pub use compare::Operator;
pub use header::HeaderValidator;
pub use json_path::JsonPathValidator;
pub use response_time::ResponseTimeValidator;
pub use status_code::StatusCodeValidator;

use crate::errors::ToolError;
use crate::services::request_executor::ResponseSnapshot;
use crate::utils::args::{fold_key, json_param, present, str_field};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    pub kind: String,
    pub target: String,
    pub operator: String,
    pub expected: Option<Value>,
    pub description: Option<String>,
}

impl ValidationRule {
    pub fn new(kind: &str, target: &str, operator: &str, expected: Option<Value>) -> Self {
        Self {
            kind: kind.to_string(),
            target: target.to_string(),
            operator: operator.to_string(),
            expected,
            description: None,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, ToolError> {
        if !value.is_object() {
            return Err(ToolError::invalid_params("Each rule must be a JSON object"));
        }
        let kind = str_field(value, "type")
            .or_else(|| str_field(value, "kind"))
            .filter(|kind| !kind.trim().is_empty())
            .ok_or_else(|| ToolError::invalid_params("Rule type is required"))?;
        let operator = str_field(value, "operator").unwrap_or_else(|| "equals".to_string());
        Ok(Self {
            kind,
            target: str_field(value, "target")
                .or_else(|| str_field(value, "path"))
                .unwrap_or_default(),
            operator,
            expected: present(value, "expected")
                .or_else(|| present(value, "expected_value"))
                .cloned(),
            description: str_field(value, "description"),
        })
    }

    /// Reads an optional rule list that may be inline or JSON text.
    pub fn list_from_args(args: &Value, name: &str) -> Result<Vec<Self>, ToolError> {
        let Some(raw) = json_param(args, name)? else {
            return Ok(Vec::new());
        };
        let items = raw
            .as_array()
            .ok_or_else(|| ToolError::invalid_params(format!("{} must be a JSON array", name)))?;
        items.iter().map(Self::from_value).collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub message: String,
    pub actual: Option<Value>,
    pub expected: Option<Value>,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ValidationOutcome {
    pub fn new(rule: &ValidationRule, passed: bool, message: impl Into<String>) -> Self {
        Self {
            passed,
            message: message.into(),
            actual: None,
            expected: rule.expected.clone(),
            kind: rule.kind.clone(),
            target: Some(rule.target.clone()).filter(|target| !target.is_empty()),
            description: rule.description.clone(),
        }
    }

    pub fn failed(rule: &ValidationRule, message: impl Into<String>) -> Self {
        Self::new(rule, false, message)
    }

    pub fn with_actual(mut self, actual: Value) -> Self {
        self.actual = Some(actual);
        self
    }
}

pub trait Validator: Send + Sync {
    /// Registry key; matched against rule kinds after folding.
    fn kind(&self) -> &'static str;

    fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError>;
}

#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StatusCodeValidator));
        registry.register(Arc::new(ResponseTimeValidator));
        registry.register(Arc::new(HeaderValidator));
        registry.register(Arc::new(JsonPathValidator));
        registry.register(Arc::new(BodyContainsValidator));
        registry.register(Arc::new(BodyEqualsValidator));
        registry.register(Arc::new(BodyRegexValidator));
        registry
    }

    pub fn register(&mut self, validator: Arc<dyn Validator>) {
        self.validators.insert(fold_key(validator.kind()), validator);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Validator>> {
        self.validators.get(&fold_key(kind.trim())).cloned()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = self.validators.values().map(|v| v.kind()).collect();
        kinds.sort_unstable();
        kinds
    }

    /// An unregistered kind yields a failed outcome so sibling rules still run.
    pub fn validate(
        &self,
        response: &ResponseSnapshot,
        rule: &ValidationRule,
    ) -> Result<ValidationOutcome, ToolError> {
        match self.get(&rule.kind) {
            Some(validator) => validator.validate(response, rule),
            None => Ok(ValidationOutcome::failed(
                rule,
                format!("Validator not found for type '{}'", rule.kind),
            )),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::response;
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_kind_is_a_failed_outcome() {
        let registry = ValidatorRegistry::with_defaults();
        let rule = ValidationRule::new("Schema", "", "equals", Some(json!(1)));
        let outcome = registry.validate(&response(200, "{}"), &rule).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.message, "Validator not found for type 'Schema'");
    }

    #[test]
    fn kinds_are_matched_loosely() {
        let registry = ValidatorRegistry::with_defaults();
        assert!(registry.get("status_code").is_some());
        assert!(registry.get("JSONPATH").is_some());
        assert!(registry.get("body-regex").is_some());
        assert_eq!(registry.kinds().len(), 7);
    }

    #[test]
    fn rule_parses_case_insensitive_fields() {
        let rule = ValidationRule::from_value(&json!({
            "Type": "JsonPath",
            "Target": "$.id",
            "Operator": "Equals",
            "Expected": 7,
            "description": "id matches"
        }))
        .unwrap();
        assert_eq!(rule.kind, "JsonPath");
        assert_eq!(rule.target, "$.id");
        assert_eq!(rule.expected, Some(json!(7)));
    }

    #[test]
    fn rule_list_accepts_json_text() {
        let args = json!({"rules": "[{\"type\":\"StatusCode\",\"expected\":200}]"});
        let rules = ValidationRule::list_from_args(&args, "rules").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].operator, "equals");
        assert!(ValidationRule::list_from_args(&json!({"rules": "{"}), "rules").is_err());
    }
}
