//! Variable bindings supplied by the caller

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A concrete bound value
///
/// Untagged so JSON scalars deserialize directly: `true`, `42`, `"x"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// Plain string coercion, the display form used after a filter chain
    pub fn coerce_string(&self) -> String {
        self.to_string()
    }

    /// Numeric view of the value, parsing strings when possible
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Render a number as a literal token: integral values without a decimal point
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Closed set of declarable variable types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    String,
    Number,
    Boolean,
    Object,
    TimePeriod,
    TimeValue,
    StringArray,
    NumberArray,
    BooleanArray,
    ObjectArray,
}

impl VariableType {
    pub const ALL: [VariableType; 10] = [
        VariableType::String,
        VariableType::Number,
        VariableType::Boolean,
        VariableType::Object,
        VariableType::TimePeriod,
        VariableType::TimeValue,
        VariableType::StringArray,
        VariableType::NumberArray,
        VariableType::BooleanArray,
        VariableType::ObjectArray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::Number => "number",
            VariableType::Boolean => "boolean",
            VariableType::Object => "object",
            VariableType::TimePeriod => "time period",
            VariableType::TimeValue => "time value",
            VariableType::StringArray => "string array",
            VariableType::NumberArray => "number array",
            VariableType::BooleanArray => "boolean array",
            VariableType::ObjectArray => "object array",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One caller-supplied binding for a named placeholder
///
/// The declared type stays raw text rather than the enum: `validate` reports
/// unknown names as data, and `prepare` raises naming the bad value, so an
/// invalid declaration has to be representable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
}

impl Binding {
    pub fn typed(value: impl Into<Value>, declared_type: VariableType) -> Self {
        Self {
            value: value.into(),
            declared_type: Some(declared_type.name().to_string()),
        }
    }

    /// Binding with no declared type; accepted by `validate`, rejected by
    /// `prepare`
    pub fn untyped(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            declared_type: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::typed(Value::String(value.into()), VariableType::String)
    }

    pub fn number(value: f64) -> Self {
        Self::typed(Value::Number(value), VariableType::Number)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(Value::Bool(value), VariableType::Boolean)
    }
}

/// Binding map keyed by variable name
pub type Bindings = HashMap<String, Binding>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display_drops_integral_fraction() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(3.25).to_string(), "3.25");
        assert_eq!(Value::Number(-7.0).to_string(), "-7");
    }

    #[test]
    fn test_coerce_number_from_string() {
        assert_eq!(Value::from(" 12.5 ").coerce_number(), Some(12.5));
        assert_eq!(Value::from("nope").coerce_number(), None);
        assert_eq!(Value::Bool(true).coerce_number(), Some(1.0));
    }

    #[test]
    fn test_variable_type_round_trip() {
        for t in VariableType::ALL {
            assert_eq!(VariableType::from_name(t.name()), Some(t));
        }
        assert_eq!(VariableType::from_name("tuple"), None);
    }

    #[test]
    fn test_binding_json_shape() {
        let binding: Binding =
            serde_json::from_str(r#"{"value": "x", "type": "string"}"#).expect("Should deserialize");
        assert_eq!(binding, Binding::string("x"));

        let untyped: Binding = serde_json::from_str(r#"{"value": 42}"#).expect("Should deserialize");
        assert_eq!(untyped, Binding::untyped(42.0));
    }
}
