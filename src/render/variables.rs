//! Variable defaults and value validation.

use regex::Regex;

use crate::template::{TemplateVariable, VariableValue, Variables};

/// Outcome of checking supplied values against a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Fill in declared defaults for names the caller did not supply.
///
/// Supplied values always win. Variables with neither a supplied value nor a
/// default stay absent.
pub fn merge_variables(schema: &[TemplateVariable], supplied: &Variables) -> Variables {
    let mut merged: Variables = schema
        .iter()
        .filter_map(|var| var.default.clone().map(|d| (var.name.clone(), d)))
        .collect();
    merged.extend(supplied.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Convert string values to the declared number or boolean type where they
/// parse as one. Command-line values arrive as text.
pub fn coerce_variables(schema: &[TemplateVariable], supplied: &Variables) -> Variables {
    supplied
        .iter()
        .map(|(name, value)| {
            let declared = schema.iter().find(|v| v.name == *name).map(|v| v.var_type);
            let value = match value.as_str() {
                Some(text) => VariableValue::parse_as(text, declared),
                None => value.clone(),
            };
            (name.clone(), value)
        })
        .collect()
}

/// Check values against a schema, collecting every violation.
///
/// Checks, per declared variable: presence when required, the value's type,
/// the regex pattern, and enum membership. Pattern and enum checks apply to
/// string values only.
pub fn validate_variables(schema: &[TemplateVariable], values: &Variables) -> ValidationReport {
    let mut errors = Vec::new();

    for var in schema {
        let Some(value) = values.get(&var.name) else {
            if var.required {
                errors.push(format!("Required variable '{}' is missing", var.name));
            }
            continue;
        };

        if value.variable_type() != var.var_type {
            errors.push(format!(
                "Variable '{}' has wrong type: expected {}, got {}",
                var.name,
                var.var_type,
                value.variable_type()
            ));
        }

        let Some(text) = value.as_str() else {
            continue;
        };

        if let Some(pattern) = &var.regex {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(text) => errors.push(format!(
                    "Variable '{}' does not match pattern: {}",
                    var.name, pattern
                )),
                Ok(_) => {}
                Err(_) => errors.push(format!(
                    "Variable '{}' has an invalid pattern: {}",
                    var.name, pattern
                )),
            }
        }

        if let Some(allowed) = &var.enum_values {
            if !allowed.iter().any(|a| a == text) {
                errors.push(format!(
                    "Variable '{}' must be one of: {}. Got: {}",
                    var.name,
                    allowed.join(", "),
                    text
                ));
            }
        }
    }

    ValidationReport::from_errors(errors)
}
