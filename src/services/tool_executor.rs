use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::args::field;
use crate::utils::tool_errors::suggest;

use serde_json::Value;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
    alias_map: HashMap<String, String>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        handlers: HashMap<String, Arc<dyn ToolHandler>>,
        alias_map: HashMap<String, String>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
            alias_map,
        }
    }

    /// Canonical tool name plus the alias it was invoked as, if any.
    fn resolve_alias(&self, tool: &str) -> (String, Option<String>) {
        if self.handlers.contains_key(tool) {
            return (tool.to_string(), None);
        }
        match self.alias_map.get(tool) {
            Some(mapped) => (mapped.clone(), Some(tool.to_string())),
            None => (tool.to_string(), None),
        }
    }

    fn strip_args_for_handler(&self, args: &Value) -> Value {
        let mut cleaned = args.clone();
        if let Value::Object(map) = &mut cleaned {
            map.remove("trace_id");
        }
        cleaned
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .keys()
            .chain(self.alias_map.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let started = Instant::now();
        let (resolved_tool, invoked_as) = self.resolve_alias(tool);
        let Some(handler) = self.handlers.get(&resolved_tool).cloned() else {
            let names = self.tool_names();
            let candidates: Vec<&str> = names.iter().map(String::as_str).collect();
            let suggestions = suggest(tool, &candidates, 6);
            let hint = if suggestions.is_empty() {
                format!("Available tools: {}", candidates.join(", "))
            } else {
                format!("Did you mean: {}", suggestions.join(", "))
            };
            return Err(
                ToolError::invalid_params(format!("Unknown tool: {}", tool)).with_hint(hint)
            );
        };

        let trace_id = args
            .get("trace_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let action = field(&args, "action").cloned().unwrap_or(Value::Null);

        self.logger.debug(
            resolved_tool.as_str(),
            Some(&serde_json::json!({"action": action, "trace_id": trace_id})),
        );

        let result = handler.handle(self.strip_args_for_handler(&args)).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                self.logger.warn(
                    "Tool call failed",
                    Some(&serde_json::json!({
                        "tool": resolved_tool,
                        "action": action,
                        "code": err.code,
                        "trace_id": trace_id,
                        "duration_ms": duration_ms,
                    })),
                );
                return Err(err);
            }
        };

        let mut meta = serde_json::json!({
            "trace_id": trace_id,
            "duration_ms": duration_ms,
        });
        if let (Some(alias), Value::Object(map)) = (invoked_as, &mut meta) {
            map.insert("invoked_as".to_string(), Value::String(alias));
        }
        Ok(serde_json::json!({
            "tool": resolved_tool,
            "action": action,
            "result": result,
            "meta": meta,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn handle(&self, args: Value) -> Result<Value, ToolError> {
            Ok(json!({"echo": args}))
        }
    }

    fn executor() -> ToolExecutor {
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("mcp_echo".to_string(), Arc::new(Echo));
        let mut aliases = HashMap::new();
        aliases.insert("echo".to_string(), "mcp_echo".to_string());
        ToolExecutor::new(Logger::new("test"), handlers, aliases)
    }

    #[tokio::test]
    async fn wraps_results_in_an_envelope() {
        let out = executor()
            .execute("echo", json!({"action": "ping", "trace_id": "t-1"}))
            .await
            .unwrap();
        assert_eq!(out["tool"], "mcp_echo");
        assert_eq!(out["action"], "ping");
        assert_eq!(out["meta"]["trace_id"], "t-1");
        assert_eq!(out["meta"]["invoked_as"], "echo");
        assert!(out["result"]["echo"].get("trace_id").is_none());
    }

    #[tokio::test]
    async fn unknown_tool_suggests_close_names() {
        let err = executor().execute("mcp_ecko", json!({})).await.unwrap_err();
        assert_eq!(err.message, "Unknown tool: mcp_ecko");
        assert!(err.hint.unwrap_or_default().contains("mcp_echo"));
    }
}
