//! Literal-to-placeholder rewriting.
//!
//! Finalizing a template replaces each annotated default with a `{{name}}`
//! placeholder so the authored app stays buildable while the template renders
//! whatever value is supplied at generation time.

use regex::Regex;

use super::parser::{FileAnnotations, INLINE_ASSIGNMENT, LITERAL};
use crate::template::VariableType;

/// Placeholder text for a variable of the given type.
///
/// Strings keep their quotes so the rendered source stays a string literal.
pub fn placeholder(name: &str, var_type: VariableType) -> String {
    match var_type {
        VariableType::String => format!("\"{{{{{}}}}}\"", name),
        _ => format!("{{{{{}}}}}", name),
    }
}

/// Replace the assigned literal on `line` with a placeholder.
///
/// The text before the literal, the statement terminator, any trailing
/// comment, and the annotation itself are kept verbatim. Lines without a
/// recognizable assignment are returned unchanged.
pub fn rewrite_line(line: &str, name: &str, var_type: VariableType) -> String {
    let value = placeholder(name, var_type);

    let inline = Regex::new(&format!(
        r"^(.+?=\s*)(?:{LITERAL})([;,]?\s*(?://|#)\s*strata:var.*)$"
    ));
    if let Some(caps) = inline.ok().and_then(|re| re.captures(line)) {
        return format!("{}{}{}", &caps[1], value, &caps[2]);
    }

    let assignment = Regex::new(&format!(
        r"^(.*?\b{}\s*=\s*)(?:{LITERAL})([;,]?\s*(?:(?://|#).*)?)$",
        regex::escape(name)
    ));
    if let Some(caps) = assignment.ok().and_then(|re| re.captures(line)) {
        return format!("{}{}{}", &caps[1], value, &caps[2]);
    }

    line.to_string()
}

/// Rewrite every annotated assignment in a file.
///
/// An inline annotation rewrites its own line; an annotation on a line by
/// itself rewrites the line after it.
pub fn rewrite_content(content: &str, annotations: &FileAnnotations) -> String {
    let mut lines: Vec<String> = content.split('\n').map(String::from).collect();

    for var in &annotations.variables {
        let index = var.line - 1;
        let Some(own) = lines.get(index) else {
            continue;
        };

        let target = if INLINE_ASSIGNMENT.is_match(own) {
            index
        } else {
            index + 1
        };
        if let Some(line) = lines.get_mut(target) {
            *line = rewrite_line(line, &var.name, var.var_type);
        }
    }

    lines.join("\n")
}
