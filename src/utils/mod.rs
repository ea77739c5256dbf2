pub mod args;
pub mod feature_flags;
pub mod http_url;
pub mod json_path;
pub mod path_value;
pub mod redact;
pub mod regex_cache;
pub mod text;
pub mod tool_errors;
