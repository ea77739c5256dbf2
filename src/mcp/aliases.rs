use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const BUILTIN_TOOL_ALIASES: &[(&str, &str)] = &[
    ("http_test", "mcp_http_test"),
    ("api_test", "mcp_http_test"),
];

static BUILTIN_TOOL_ALIAS_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (alias, target) in BUILTIN_TOOL_ALIASES {
        map.insert(*alias, *target);
    }
    map
});

pub fn builtin_tool_aliases() -> &'static [(&'static str, &'static str)] {
    BUILTIN_TOOL_ALIASES
}

pub fn canonical_tool_name(tool: &str) -> &str {
    BUILTIN_TOOL_ALIAS_MAP.get(tool).copied().unwrap_or(tool)
}

pub fn builtin_tool_alias_map_owned() -> HashMap<String, String> {
    BUILTIN_TOOL_ALIASES
        .iter()
        .map(|(alias, target)| (alias.to_string(), target.to_string()))
        .collect()
}
