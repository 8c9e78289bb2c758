//! Template variable definitions.
//!
//! Variables are declared per template in `variables.json` and control how
//! `{{name}}` placeholders are filled during generation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Supplied or merged variable values, keyed by variable name.
pub type Variables = BTreeMap<String, VariableValue>;

/// A concrete variable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl VariableValue {
    /// The declared type this value inhabits.
    pub fn variable_type(&self) -> VariableType {
        match self {
            VariableValue::Bool(_) => VariableType::Boolean,
            VariableValue::Number(_) => VariableType::Number,
            VariableValue::String(_) => VariableType::String,
        }
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariableValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a `key=value` style command-line value against a declared type.
    ///
    /// Falls back to a string when the text does not parse as the declared type,
    /// leaving the type mismatch for validation to report.
    pub fn parse_as(text: &str, ty: Option<VariableType>) -> Self {
        match ty {
            Some(VariableType::Boolean) => match text {
                "true" => VariableValue::Bool(true),
                "false" => VariableValue::Bool(false),
                _ => VariableValue::String(text.to_string()),
            },
            Some(VariableType::Number) => parse_number(text)
                .map(VariableValue::Number)
                .unwrap_or_else(|| VariableValue::String(text.to_string())),
            _ => VariableValue::String(text.to_string()),
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Bool(b) => write!(f, "{}", b),
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(s: &str) -> Self {
        VariableValue::String(s.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(s: String) -> Self {
        VariableValue::String(s)
    }
}

impl From<bool> for VariableValue {
    fn from(b: bool) -> Self {
        VariableValue::Bool(b)
    }
}

impl From<i64> for VariableValue {
    fn from(n: i64) -> Self {
        VariableValue::Number(n.into())
    }
}

/// Parse a numeric literal, keeping integers integral.
pub fn parse_number(text: &str) -> Option<serde_json::Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(i.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
}

/// Types a template variable may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Number,
    Boolean,
}

impl VariableType {
    /// Lowercase type name as it appears in schema files and annotations.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::Number => "number",
            VariableType::Boolean => "boolean",
        }
    }

    /// Parse a lowercase type name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(VariableType::String),
            "number" => Some(VariableType::Number),
            "boolean" => Some(VariableType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable declared by a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariable {
    /// Variable name (unique per template)
    pub name: String,

    /// Declared value type
    #[serde(rename = "type")]
    pub var_type: VariableType,

    /// Whether generation requires a value
    #[serde(default)]
    pub required: bool,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value used when none is supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<VariableValue>,

    /// Pattern string values must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Allowed string values
    #[serde(
        rename = "enum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enum_values: Option<Vec<String>>,
}

impl TemplateVariable {
    /// Create a variable with no default or constraints.
    pub fn new(name: impl Into<String>, var_type: VariableType, required: bool) -> Self {
        Self {
            name: name.into(),
            var_type,
            required,
            description: None,
            default: None,
            regex: None,
            enum_values: None,
        }
    }

    /// Builder: set the default value.
    pub fn with_default(mut self, value: impl Into<VariableValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Builder: set the regex constraint.
    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// Builder: set the enum constraint.
    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
