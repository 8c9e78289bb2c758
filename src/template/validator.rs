//! Structural validation of descriptors and variable schemas.
//!
//! Every check collects errors rather than stopping at the first one, so a
//! template author sees everything wrong with a file at once.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::descriptor::{RawDescriptor, LATEST};
use super::variable::{TemplateVariable, VariableType, VariableValue};

static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid semver pattern"));

/// Whether `s` is a plain `X.Y.Z` version.
pub fn is_semver(s: &str) -> bool {
    SEMVER.is_match(s)
}

/// Validate the top-level fields of a raw descriptor.
pub fn validate_raw_descriptor(raw: &RawDescriptor) -> Vec<String> {
    let mut errors = Vec::new();

    if raw.name.trim().is_empty() {
        errors.push("name: Template name is required".to_string());
    }
    if raw.platform.trim().is_empty() {
        errors.push("platform: Platform is required".to_string());
    }
    if !is_semver(&raw.version) {
        errors.push(format!(
            "version: Version must follow semver format (e.g. 0.1.0), got '{}'",
            raw.version
        ));
    }

    if let Some(ext) = &raw.extends {
        if ext.template.trim().is_empty() {
            errors.push("extends.template: Parent template name is required".to_string());
        }
        if let Some(v) = &ext.version {
            if v != LATEST && !is_semver(v) {
                errors.push(format!(
                    "extends.version: must be semver or '{}', got '{}'",
                    LATEST, v
                ));
            }
        }
        if matches!(&ext.patch_file, Some(p) if p.trim().is_empty()) {
            errors.push("extends.patchFile: Patch file path is required".to_string());
        }
        if raw.based_on.is_some() {
            errors.push("basedOn: cannot be combined with extends".to_string());
        }
    }

    if let Some(layer) = &raw.layer {
        if layer.patch_file.trim().is_empty() {
            errors.push("layer.patchFile: Patch file path is required".to_string());
        }
    }

    errors
}

/// Validate a list of variable definitions.
pub fn validate_variables(variables: &[TemplateVariable]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, var) in variables.iter().enumerate() {
        let at = format!("variables.{}", i);

        if var.name.trim().is_empty() {
            errors.push(format!("{}.name: Variable name is required", at));
        } else if !seen.insert(var.name.as_str()) {
            errors.push(format!("{}.name: Duplicate variable '{}'", at, var.name));
        }

        let regex = match &var.regex {
            Some(pattern) => match Regex::new(pattern) {
                Ok(r) => Some(r),
                Err(e) => {
                    errors.push(format!("{}.regex: Invalid pattern '{}': {}", at, pattern, e));
                    None
                }
            },
            None => None,
        };

        if let Some(values) = &var.enum_values {
            if values.is_empty() {
                errors.push(format!("{}.enum: must list at least one value", at));
            }
        }

        if let Some(default) = &var.default {
            if default.variable_type() != var.var_type {
                errors.push(format!(
                    "{}.default: expected {}, got {}",
                    at,
                    var.var_type,
                    default.variable_type()
                ));
                continue;
            }
            if let (Some(re), VariableValue::String(s)) = (&regex, default) {
                if !re.is_match(s) {
                    errors.push(format!(
                        "{}.default: '{}' does not match pattern {}",
                        at,
                        s,
                        re.as_str()
                    ));
                }
            }
            if let (Some(values), VariableValue::String(s)) = (&var.enum_values, default) {
                if !values.is_empty() && !values.contains(s) {
                    errors.push(format!(
                        "{}.default: '{}' must be one of [{}]",
                        at,
                        s,
                        values.join(", ")
                    ));
                }
            }
        }

        if var.var_type != VariableType::String
            && (var.regex.is_some() || var.enum_values.is_some())
        {
            errors.push(format!(
                "{}: regex and enum constraints only apply to string variables",
                at
            ));
        }
    }

    errors
}
