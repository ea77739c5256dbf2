use crate::errors::ToolError;
use crate::utils::args::present;
use serde_json::Value;

/// Shape checks for tool arguments that do not belong to any one action.
#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_object(&self, value: &Value, label: &str) -> Result<(), ToolError> {
        if value.is_object() {
            return Ok(());
        }
        Err(ToolError::invalid_params(format!(
            "{} must be a JSON object",
            label
        )))
    }

    pub fn ensure_string(
        &self,
        value: &Value,
        label: &str,
        trim: bool,
    ) -> Result<String, ToolError> {
        let text = value.as_str().ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    pub fn ensure_action(&self, args: &Value) -> Result<String, ToolError> {
        let action = present(args, "action")
            .ok_or_else(|| ToolError::invalid_params("action is required"))?;
        self.ensure_string(action, "action", true)
    }

    /// A path expression; absent means the document root.
    pub fn ensure_path(&self, value: Option<&Value>) -> Result<String, ToolError> {
        match value {
            None | Some(Value::Null) => Ok("$".to_string()),
            Some(Value::String(path)) => Ok(path.trim().to_string()),
            Some(_) => Err(ToolError::invalid_params("path must be a string")),
        }
    }
}
