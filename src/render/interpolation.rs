//! Placeholder substitution for template contents and paths.
//!
//! # Syntax
//!
//! - `{{name}}` or `{{ name }}` - replaced with the variable's value
//! - `{{{name}}}` - same as `{{name}}`; values are never escaped
//! - Unknown names render as the empty string
//! - Anything else between braces is left untouched
//!
//! # Example
//!
//! ```
//! use strata::render::render_template;
//! use strata::template::{Variables, VariableValue};
//!
//! let mut vars = Variables::new();
//! vars.insert("appName".into(), VariableValue::from("Demo"));
//! assert_eq!(render_template("let name = \"{{ appName }}\"", &vars), "let name = \"Demo\"");
//! ```

use std::collections::BTreeSet;

use crate::template::Variables;

/// A segment of a templated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Placeholder reference: {{name}}
    Placeholder(String),
}

/// Parse a string containing `{{name}}` placeholders.
pub fn parse_placeholders(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        literal.push_str(&rest[..start]);
        let after = &rest[start..];

        match placeholder_at(after) {
            Some((name, consumed)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.to_string()));
                rest = &after[consumed..];
            }
            None => {
                literal.push_str("{{");
                rest = &after[2..];
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Recognize a placeholder at the start of `s` (which begins with `{{`).
///
/// Returns the trimmed name and the number of bytes consumed.
fn placeholder_at(s: &str) -> Option<(&str, usize)> {
    let (open, close) = if s.starts_with("{{{") {
        ("{{{", "}}}")
    } else {
        ("{{", "}}")
    };

    let body = &s[open.len()..];
    let end = body.find(close)?;
    let name = body[..end].trim();

    is_name(name).then_some((name, open.len() + end + close.len()))
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Names of all placeholders in a string.
pub fn placeholder_names(input: &str) -> BTreeSet<String> {
    parse_placeholders(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Placeholder(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// Check if a string contains any placeholder.
pub fn has_placeholders(input: &str) -> bool {
    parse_placeholders(input)
        .iter()
        .any(|seg| matches!(seg, Segment::Placeholder(_)))
}

/// Substitute placeholders in file content.
pub fn render_template(content: &str, values: &Variables) -> String {
    let mut out = String::with_capacity(content.len());
    for segment in parse_placeholders(content) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Placeholder(name) => {
                if let Some(value) = values.get(&name) {
                    out.push_str(&value.to_string());
                }
            }
        }
    }
    out
}

/// Substitute placeholders in a single file or directory name.
pub fn render_path(segment: &str, values: &Variables) -> String {
    render_template(segment, values)
}
