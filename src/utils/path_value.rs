use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// A JSON value after terminal conversion.
///
/// Numbers that fit an `i32` stay integral, everything else numeric becomes a
/// float. Objects are never deep-converted: they keep their raw JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum PathValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<PathValue>),
    Object(String),
}

impl PathValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => PathValue::Null,
            Value::Bool(flag) => PathValue::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) if i32::try_from(int).is_ok() => PathValue::Int(int),
                _ => PathValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => PathValue::String(text.clone()),
            Value::Array(items) => PathValue::List(items.iter().map(PathValue::from_json).collect()),
            Value::Object(_) => PathValue::Object(value.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PathValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PathValue::Int(int) => Some(*int as f64),
            PathValue::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PathValue::Null => "null",
            PathValue::Bool(_) => "bool",
            PathValue::Int(_) => "integer",
            PathValue::Float(_) => "float",
            PathValue::String(_) => "string",
            PathValue::List(_) => "array",
            PathValue::Object(_) => "object",
        }
    }

    /// Text form used by string comparisons.
    pub fn to_text(&self) -> String {
        match self {
            PathValue::Null => "null".to_string(),
            PathValue::Bool(flag) => flag.to_string(),
            PathValue::Int(int) => int.to_string(),
            PathValue::Float(float) => float.to_string(),
            PathValue::String(text) => text.clone(),
            PathValue::List(_) => self.to_json().to_string(),
            PathValue::Object(raw) => raw.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            PathValue::Null => Value::Null,
            PathValue::Bool(flag) => Value::Bool(*flag),
            PathValue::Int(int) => Value::Number((*int).into()),
            PathValue::Float(float) => serde_json::Number::from_f64(*float)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PathValue::String(text) => Value::String(text.clone()),
            PathValue::List(items) => Value::Array(items.iter().map(PathValue::to_json).collect()),
            PathValue::Object(raw) => Value::String(raw.clone()),
        }
    }
}

impl From<&Value> for PathValue {
    fn from(value: &Value) -> Self {
        PathValue::from_json(value)
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl Serialize for PathValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::PathValue;
    use serde_json::json;

    #[test]
    fn numbers_outside_i32_become_floats() {
        assert_eq!(PathValue::from_json(&json!(42)), PathValue::Int(42));
        assert_eq!(
            PathValue::from_json(&json!(3_000_000_000i64)),
            PathValue::Float(3_000_000_000.0)
        );
        assert_eq!(PathValue::from_json(&json!(1.5)), PathValue::Float(1.5));
    }

    #[test]
    fn objects_keep_raw_text() {
        let value = PathValue::from_json(&json!({"a": 1}));
        assert_eq!(value, PathValue::Object("{\"a\":1}".to_string()));
        assert_eq!(value.to_json(), json!("{\"a\":1}"));
    }

    #[test]
    fn arrays_convert_recursively() {
        let value = PathValue::from_json(&json!([1, "two", null, {"k": true}]));
        assert_eq!(
            value,
            PathValue::List(vec![
                PathValue::Int(1),
                PathValue::String("two".to_string()),
                PathValue::Null,
                PathValue::Object("{\"k\":true}".to_string()),
            ])
        );
        assert_eq!(value.to_text(), "[1,\"two\",null,\"{\\\"k\\\":true}\"]");
    }

    #[test]
    fn text_forms() {
        assert_eq!(PathValue::Float(30.0).to_text(), "30");
        assert_eq!(PathValue::Bool(true).to_text(), "true");
        assert_eq!(PathValue::Null.to_text(), "null");
    }
}
