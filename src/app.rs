use crate::config::EngineDefaults;
use crate::errors::ToolError;
use crate::managers::http_test::HttpTestManager;
use crate::mcp::aliases::builtin_tool_alias_map_owned;
use crate::mcp::catalog::tool_catalog;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::transport::{HttpTransport, ReqwestTransport};
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub defaults: EngineDefaults,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
        alias_map: &HashMap<String, String>,
    ) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .map(|tool| tool.name.clone())
            .filter(|name| !handlers.contains_key(name) && !alias_map.contains_key(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint(
                "Every tool in tool_catalog.json must have a handler or an alias_map entry."
                    .to_string(),
            )
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    pub fn initialize() -> Result<Self, ToolError> {
        let defaults = EngineDefaults::from_env();
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(defaults.max_body_bytes));
        Self::with_transport(defaults, transport)
    }

    /// Builds the tool graph around an arbitrary transport.
    pub fn with_transport(
        defaults: EngineDefaults,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ToolError> {
        let logger = Logger::new("apiprobe");
        let http_test = Arc::new(HttpTestManager::with_transport(
            logger.clone(),
            defaults,
            transport,
        ));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("mcp_http_test".to_string(), http_test);

        let alias_map = builtin_tool_alias_map_owned();
        Self::validate_tool_wiring(&handlers, &alias_map)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers, alias_map));
        logger.debug(
            "Initialized",
            Some(&serde_json::json!({
                "timeout_seconds": defaults.timeout_seconds,
                "follow_redirects": defaults.follow_redirects,
                "validate_ssl": defaults.validate_ssl,
                "max_body_bytes": defaults.max_body_bytes,
            })),
        );
        Ok(Self {
            logger,
            defaults,
            tool_executor,
        })
    }
}
