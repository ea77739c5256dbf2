//! Single-test and suite orchestration.
//!
//! Everything runs strictly in order: one request, then its rules, then the
//! next test. Nothing is retried.

use crate::config::EngineDefaults;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::request_executor::{RequestExecutor, RequestSpec, ResponseSnapshot};
use crate::services::validators::{ValidationOutcome, ValidationRule, ValidatorRegistry};
use crate::utils::args::{bool_field, json_param, str_field, u64_field};
use crate::utils::http_url::join_base_and_path;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct TestSpec {
    pub name: Option<String>,
    pub request: RequestSpec,
    pub path: Option<String>,
    pub expected_status: Option<u64>,
    pub max_response_time_ms: Option<u64>,
    pub rules: Vec<ValidationRule>,
}

impl TestSpec {
    pub fn new(request: RequestSpec) -> Self {
        Self {
            name: None,
            request,
            path: None,
            expected_status: None,
            max_response_time_ms: None,
            rules: Vec::new(),
        }
    }

    /// A standalone test; `url` is required.
    pub fn from_args(args: &Value, defaults: &EngineDefaults) -> Result<Self, ToolError> {
        let request = RequestSpec::from_args(args, defaults)?;
        Self::with_request(args, request)
    }

    /// A suite entry; `url` or `path` is resolved later against the base URL.
    pub fn from_suite_entry(entry: &Value, defaults: &EngineDefaults) -> Result<Self, ToolError> {
        if !entry.is_object() {
            return Err(ToolError::invalid_params("Each test must be a JSON object"));
        }
        let url = str_field(entry, "url").unwrap_or_default();
        let request = RequestSpec::parse(entry, url, defaults)?;
        let mut spec = Self::with_request(entry, request)?;
        spec.path = str_field(entry, "path");
        Ok(spec)
    }

    fn with_request(args: &Value, request: RequestSpec) -> Result<Self, ToolError> {
        let rules = match ValidationRule::list_from_args(args, "rules")? {
            rules if !rules.is_empty() => rules,
            _ => ValidationRule::list_from_args(args, "validations")?,
        };
        Ok(Self {
            name: str_field(args, "name"),
            request,
            path: None,
            expected_status: u64_field(args, "expected_status")?,
            max_response_time_ms: u64_field(args, "max_response_time_ms")?,
            rules,
        })
    }

    /// Explicit `url` wins over `base_url` + `path`.
    pub fn effective_url(&self, base_url: Option<&str>) -> Result<String, ToolError> {
        if !self.request.url.trim().is_empty() {
            return Ok(self.request.url.clone());
        }
        match self.path.as_deref() {
            Some(path) => Ok(join_base_and_path(base_url.unwrap_or_default(), path)),
            None => Err(ToolError::invalid_params("Test requires either url or path")),
        }
    }

    /// Shortcut rules first, then the explicit ones.
    pub fn rules(&self) -> Vec<ValidationRule> {
        let mut rules = Vec::with_capacity(self.rules.len() + 2);
        if let Some(status) = self.expected_status {
            rules.push(ValidationRule::new("StatusCode", "", "equals", Some(json!(status))));
        }
        if let Some(max_ms) = self.max_response_time_ms {
            rules.push(ValidationRule::new(
                "ResponseTime",
                "",
                "lessthanorequal",
                Some(json!(max_ms)),
            ));
        }
        rules.extend(self.rules.iter().cloned());
        rules
    }
}

#[derive(Debug, Clone)]
pub struct SuiteSpec {
    pub base_url: Option<String>,
    pub tests: Vec<TestSpec>,
    pub stop_on_failure: bool,
}

impl SuiteSpec {
    pub fn from_args(args: &Value, defaults: &EngineDefaults) -> Result<Self, ToolError> {
        let raw = json_param(args, "tests")?
            .ok_or_else(|| ToolError::invalid_params("tests is required"))?;
        let entries = raw
            .as_array()
            .ok_or_else(|| ToolError::invalid_params("tests must be a JSON array"))?;
        let tests = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                TestSpec::from_suite_entry(entry, defaults).map_err(|err| {
                    let message = format!("Test #{}: {}", index + 1, err.message);
                    ToolError { message, ..err }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            base_url: str_field(args, "base_url").filter(|url| !url.trim().is_empty()),
            tests,
            stop_on_failure: bool_field(args, "stop_on_failure")?.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub passed: bool,
    pub total_rules: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    pub elapsed_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
    pub validations: Vec<ValidationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestOutcome {
    fn from_validations(
        name: Option<String>,
        response: ResponseSnapshot,
        validations: Vec<ValidationOutcome>,
    ) -> Self {
        let passed_count = validations.iter().filter(|v| v.passed).count();
        let failed_count = validations.len() - passed_count;
        Self {
            name,
            passed: failed_count == 0,
            total_rules: validations.len(),
            passed_count,
            failed_count,
            elapsed_ms: response.elapsed_ms,
            response: Some(response),
            validations,
            error: None,
        }
    }

    fn errored(name: Option<String>, error: &ToolError, elapsed_ms: i64) -> Self {
        Self {
            name,
            passed: false,
            total_rules: 0,
            passed_count: 0,
            failed_count: 0,
            elapsed_ms,
            response: None,
            validations: Vec::new(),
            error: Some(error.message.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteOutcome {
    /// Configured tests, not executed ones; see `executed_tests`.
    pub total_tests: usize,
    pub executed_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub total_elapsed_ms: i64,
    pub stopped_early: bool,
    pub results: Vec<TestOutcome>,
}

pub struct TestRunner {
    executor: Arc<RequestExecutor>,
    validators: Arc<ValidatorRegistry>,
    logger: Logger,
}

impl TestRunner {
    pub fn new(
        executor: Arc<RequestExecutor>,
        validators: Arc<ValidatorRegistry>,
        logger: Logger,
    ) -> Self {
        Self {
            executor,
            validators,
            logger: logger.child("runner"),
        }
    }

    /// Runs every rule against an already captured response.
    pub fn evaluate(
        &self,
        response: &ResponseSnapshot,
        rules: &[ValidationRule],
    ) -> Result<Vec<ValidationOutcome>, ToolError> {
        rules
            .iter()
            .map(|rule| self.validators.validate(response, rule))
            .collect()
    }

    /// Execution failures and unknown operators are returned as errors.
    pub async fn run_test(&self, spec: &TestSpec) -> Result<TestOutcome, ToolError> {
        let response = self.executor.execute(&spec.request).await?;
        let validations = self.evaluate(&response, &spec.rules())?;
        Ok(TestOutcome::from_validations(
            spec.name.clone(),
            response,
            validations,
        ))
    }

    pub async fn run_suite(
        &self,
        suite: &SuiteSpec,
        cancel: Option<&CancellationToken>,
    ) -> Result<SuiteOutcome, ToolError> {
        let total_tests = suite.tests.len();
        let mut outcome = SuiteOutcome {
            total_tests,
            executed_tests: 0,
            passed_tests: 0,
            failed_tests: 0,
            total_elapsed_ms: 0,
            stopped_early: false,
            results: Vec::with_capacity(total_tests),
        };

        for (index, test) in suite.tests.iter().enumerate() {
            if cancel.map(CancellationToken::is_cancelled).unwrap_or(false) {
                self.logger.warn(
                    "Suite cancelled",
                    Some(&json!({"executed": outcome.executed_tests, "total": total_tests})),
                );
                return Err(ToolError::cancelled(format!(
                    "Suite cancelled after {} of {} tests",
                    outcome.executed_tests, total_tests
                ))
                .with_details(json!({
                    "total_tests": total_tests,
                    "executed_tests": outcome.executed_tests,
                    "passed_tests": outcome.passed_tests,
                    "failed_tests": outcome.failed_tests,
                    "total_elapsed_ms": outcome.total_elapsed_ms,
                })));
            }

            let started = Instant::now();
            let result = match test.effective_url(suite.base_url.as_deref()) {
                Ok(url) => {
                    let mut resolved = test.clone();
                    resolved.request.url = url;
                    self.run_test(&resolved).await
                }
                Err(err) => Err(err),
            };
            let result = result.unwrap_or_else(|err| {
                let elapsed = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
                TestOutcome::errored(test.name.clone(), &err, elapsed)
            });

            outcome.executed_tests += 1;
            outcome.total_elapsed_ms = outcome.total_elapsed_ms.saturating_add(result.elapsed_ms);
            if result.passed {
                outcome.passed_tests += 1;
            } else {
                outcome.failed_tests += 1;
            }
            let meta = json!({
                "index": index + 1,
                "name": result.name,
                "passed": result.passed,
                "elapsed_ms": result.elapsed_ms,
                "error": result.error,
            });
            self.logger.info(
                if result.passed { "Test passed" } else { "Test failed" },
                Some(&meta),
            );

            let failed = !result.passed;
            outcome.results.push(result);
            if failed && suite.stop_on_failure {
                outcome.stopped_early = outcome.executed_tests < total_tests;
                if outcome.stopped_early {
                    self.logger.warn(
                        "Stopping suite after failure",
                        Some(&json!({
                            "executed": outcome.executed_tests,
                            "skipped": total_tests - outcome.executed_tests,
                        })),
                    );
                }
                break;
            }
        }

        self.logger.info(
            "Suite finished",
            Some(&json!({
                "total": outcome.total_tests,
                "executed": outcome.executed_tests,
                "passed": outcome.passed_tests,
                "failed": outcome.failed_tests,
                "elapsed_ms": outcome.total_elapsed_ms,
            })),
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> EngineDefaults {
        EngineDefaults::default()
    }

    #[test]
    fn shortcut_rules_come_first() {
        let args = json!({
            "url": "https://api.test/health",
            "expected_status": 200,
            "maxResponseTimeMs": 250,
            "rules": [{"type": "BodyContains", "expected": "ok"}]
        });
        let spec = TestSpec::from_args(&args, &defaults()).unwrap();
        let rules = spec.rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].kind, "StatusCode");
        assert_eq!(rules[0].expected, Some(json!(200)));
        assert_eq!(rules[1].kind, "ResponseTime");
        assert_eq!(rules[2].kind, "BodyContains");
    }

    #[test]
    fn explicit_url_wins_over_base_and_path() {
        let entry = json!({"url": "https://other.test/x", "path": "/ignored"});
        let spec = TestSpec::from_suite_entry(&entry, &defaults()).unwrap();
        assert_eq!(
            spec.effective_url(Some("https://api.test")).unwrap(),
            "https://other.test/x"
        );

        let entry = json!({"path": "/users/1"});
        let spec = TestSpec::from_suite_entry(&entry, &defaults()).unwrap();
        assert_eq!(
            spec.effective_url(Some("https://api.test/")).unwrap(),
            "https://api.test/users/1"
        );
    }

    #[test]
    fn entry_without_url_or_path_fails_resolution() {
        let spec = TestSpec::from_suite_entry(&json!({"method": "GET"}), &defaults()).unwrap();
        assert!(spec.effective_url(Some("https://api.test")).is_err());
    }

    #[test]
    fn suite_args_accept_json_text() {
        let args = json!({
            "baseUrl": "https://api.test",
            "tests": "[{\"path\":\"/a\"},{\"path\":\"/b\",\"method\":\"POST\"}]",
            "stopOnFailure": "true"
        });
        let suite = SuiteSpec::from_args(&args, &defaults()).unwrap();
        assert_eq!(suite.tests.len(), 2);
        assert!(suite.stop_on_failure);
        assert_eq!(suite.tests[1].request.method, "POST");
    }

    #[test]
    fn malformed_suite_entry_names_its_position() {
        let args = json!({"tests": [{"path": "/a"}, {"path": "/b", "headers": "{oops"}]});
        let err = SuiteSpec::from_args(&args, &defaults()).unwrap_err();
        assert!(err.message.starts_with("Test #2: Invalid JSON in headers"));
    }
}
