//! Per-file annotation consistency checks.

use std::collections::HashMap;

use regex::Regex;

use super::parser::FileAnnotations;

/// Check one file's annotations, returning every problem found.
///
/// Reports duplicate variables (with both line numbers), regex or enum rules
/// naming an undeclared variable, patterns that do not compile, and enum rules
/// without values.
pub fn validate_annotations(annotations: &FileAnnotations) -> Vec<String> {
    let mut errors = Vec::new();
    let mut declared: HashMap<&str, usize> = HashMap::new();

    for var in &annotations.variables {
        if let Some(first) = declared.get(var.name.as_str()) {
            errors.push(format!(
                "Duplicate variable definition: {} (lines {} and {})",
                var.name, first, var.line
            ));
        } else {
            declared.insert(var.name.as_str(), var.line);
        }
    }

    for rule in &annotations.regex_rules {
        if !declared.contains_key(rule.name.as_str()) {
            errors.push(format!(
                "strata:regex references undefined variable: {} (line {})",
                rule.name, rule.line
            ));
        }
        if Regex::new(&rule.pattern).is_err() {
            errors.push(format!(
                "Invalid regex pattern for {}: {} (line {})",
                rule.name, rule.pattern, rule.line
            ));
        }
    }

    for rule in &annotations.enum_rules {
        if !declared.contains_key(rule.name.as_str()) {
            errors.push(format!(
                "strata:enum references undefined variable: {} (line {})",
                rule.name, rule.line
            ));
        }
        if rule.values.is_empty() {
            errors.push(format!(
                "strata:enum for {} has no values (line {})",
                rule.name, rule.line
            ));
        }
    }

    errors
}
