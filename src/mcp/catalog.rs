use crate::errors::{ErrorCode, McpError};
use crate::mcp::aliases::builtin_tool_aliases;
use crate::utils::args::fold_key;
use crate::utils::tool_errors::suggest;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

/// Rewrites `action` to the catalog spelling it folds to (`SendRequest`,
/// `send-request` -> `send_request`). Unknown actions are left for the schema
/// check to report.
pub fn normalize_action(tool_name: &str, mut args: Value) -> Value {
    let Some(known) = tool_by_name(tool_name)
        .and_then(|tool| tool.input_schema.pointer("/properties/action/enum"))
        .and_then(|v| v.as_array())
    else {
        return args;
    };
    let Some(Value::String(raw)) = args.get("action") else {
        return args;
    };
    let wanted = fold_key(raw.trim());
    let canonical = known
        .iter()
        .filter_map(|v| v.as_str())
        .find(|name| fold_key(name) == wanted)
        .map(str::to_string);
    if let (Some(canonical), Value::Object(map)) = (canonical, &mut args) {
        map.insert("action".to_string(), Value::String(canonical));
    }
    args
}

pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let Some(tool) = tool_by_name(tool_name) else {
        return Ok(());
    };
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, args, errors, &tool.input_schema);
        return Err(McpError::new(ErrorCode::InvalidParams, message));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    args: &Value,
    errors: jsonschema::ErrorIterator,
    schema: &Value,
) -> String {
    let action = args.get("action").and_then(|v| v.as_str());
    let header = if let Some(action) = action {
        format!("Invalid arguments for {}:{}", tool_name, action)
    } else {
        format!("Invalid arguments for {}", tool_name)
    };
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(10) {
        let instance_path = if err.instance_path.to_string().is_empty() {
            "(root)".to_string()
        } else {
            err.instance_path.to_string()
        };
        match &err.kind {
            jsonschema::error::ValidationErrorKind::Enum { options } => {
                let allowed: Vec<String> = options
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .map(|v| {
                                v.as_str()
                                    .map(|s| s.to_string())
                                    .unwrap_or_else(|| v.to_string())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                rendered.push(format!(
                    "{}: expected one of {}",
                    instance_path,
                    allowed.join(", ")
                ));
                let received = schema_node_at(args, &err.instance_path.to_string());
                let candidates: Vec<&str> = allowed.iter().map(String::as_str).collect();
                let suggestions = suggest(received.as_str().unwrap_or(""), &candidates, 3);
                if !suggestions.is_empty() {
                    did_you_means.push(format!("{}: {}", instance_path, suggestions.join(", ")));
                }
            }
            jsonschema::error::ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!(
                    "{}: missing required field '{}'",
                    instance_path, prop
                ));
            }
            jsonschema::error::ValidationErrorKind::Type { kind } => {
                rendered.push(format!(
                    "{}: expected {}",
                    instance_path,
                    format_type_kind(kind)
                ));
            }
            _ => {
                rendered.push(format!("{}: {}", instance_path, err));
            }
        }
    }

    let mut lines = vec![header];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!("Did you mean: {}", did_you_means.join(" | ")));
    }
    if let Some(actions) = schema
        .pointer("/properties/action/enum")
        .and_then(|v| v.as_array())
    {
        let names: Vec<&str> = actions.iter().filter_map(|v| v.as_str()).collect();
        lines.push(format!("Hint: actions are {}", names.join(", ")));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &jsonschema::error::TypeKind) -> String {
    match kind {
        jsonschema::error::TypeKind::Single(primitive) => primitive.to_string(),
        jsonschema::error::TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

fn schema_node_at(root: &Value, instance_path: &str) -> Value {
    if instance_path.is_empty() {
        return root.clone();
    }
    let mut current = root;
    for segment in instance_path.trim_start_matches('/').split('/') {
        if segment.is_empty() {
            continue;
        }
        if let Some(obj) = current.as_object() {
            current = obj.get(segment).unwrap_or(&Value::Null);
        } else if let Some(arr) = current.as_array() {
            let idx = segment.parse::<usize>().unwrap_or(0);
            current = arr.get(idx).unwrap_or(&Value::Null);
        }
    }
    current.clone()
}

/// Catalog tools plus, outside the `core` tier, their built-in aliases.
pub fn list_tools(tool_tier: &str) -> Vec<ToolDef> {
    let mut tools: Vec<ToolDef> = TOOL_CATALOG.iter().cloned().collect();
    if tool_tier == "core" {
        return tools;
    }
    let mut names: HashSet<String> = tools.iter().map(|tool| tool.name.clone()).collect();
    for (alias, target) in builtin_tool_aliases().iter() {
        if names.contains(*alias) {
            continue;
        }
        let Some(target_tool) = TOOL_MAP.get(*target) else {
            continue;
        };
        tools.push(ToolDef {
            name: (*alias).to_string(),
            description: format!("Alias for {}.", target),
            input_schema: target_tool.input_schema.clone(),
        });
        names.insert((*alias).to_string());
    }
    tools
}
