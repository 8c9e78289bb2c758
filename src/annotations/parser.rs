//! Comment-embedded annotation parsing.
//!
//! # Syntax
//!
//! Annotations live in `//` or `#` comments:
//!
//! - `strata:var <name> <string|number|boolean> <required|optional> ["description"]`
//! - `strata:regex <name> "<pattern>"`
//! - `strata:enum <name> <value> <value> ...`
//! - `strata:filename <templatedName>`
//!
//! # Example
//!
//! ```swift
//! let appName = "BaseApp" // strata:var appName string required "Display name"
//! // strata:regex appName "^[A-Za-z]+$"
//! // strata:filename {{appName}}App.swift
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, StrataError};
use crate::template::variable::parse_number;
use crate::template::{VariableType, VariableValue};

static VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?://|#)\s*strata:var\s+(\w+)\s+(string|number|boolean)\s+(required|optional)(?:\s+"([^"]+)")?"#,
    )
    .expect("valid var annotation regex")
});

static REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?://|#)\s*strata:regex\s+(\w+)\s+"([^"]+)""#).expect("valid regex annotation regex")
});

static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?://|#)\s*strata:enum\s+(\w+)\s+(.+)").expect("valid enum annotation regex")
});

static FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?://|#)\s*strata:filename\s+(.+)").expect("valid filename annotation regex")
});

/// An assigned literal: a quoted string (escapes allowed) or a bare token.
///
/// Quoted literals are matched whole so a `#` or `//` inside them is never
/// taken for a comment leader.
pub(crate) const LITERAL: &str = r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|[^\s;,]+"#;

/// Assignment on the same line as its `strata:var` annotation.
pub(crate) static INLINE_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"=\s*({LITERAL})[;,]?\s*(?://|#)\s*strata:var"))
        .expect("valid inline assignment regex")
});

/// A `strata:var` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAnnotation {
    pub name: String,
    pub var_type: VariableType,
    pub required: bool,
    pub description: Option<String>,
    /// 1-based line number
    pub line: usize,
    /// The annotated source line, verbatim
    pub text: String,
}

/// A `strata:regex` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexAnnotation {
    pub name: String,
    pub pattern: String,
    pub line: usize,
    pub text: String,
}

/// A `strata:enum` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumAnnotation {
    pub name: String,
    pub values: Vec<String>,
    pub line: usize,
    pub text: String,
}

/// A `strata:filename` rename.
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameAnnotation {
    /// Replacement file name, usually containing `{{placeholders}}`
    pub templated_name: String,
    pub line: usize,
    pub text: String,
}

/// Any single annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Variable(VariableAnnotation),
    Regex(RegexAnnotation),
    Enum(EnumAnnotation),
    Filename(FilenameAnnotation),
}

impl Annotation {
    /// 1-based line number the annotation was found on.
    pub fn line(&self) -> usize {
        match self {
            Annotation::Variable(a) => a.line,
            Annotation::Regex(a) => a.line,
            Annotation::Enum(a) => a.line,
            Annotation::Filename(a) => a.line,
        }
    }

    /// Source line the annotation was parsed from.
    pub fn text(&self) -> &str {
        match self {
            Annotation::Variable(a) => &a.text,
            Annotation::Regex(a) => &a.text,
            Annotation::Enum(a) => &a.text,
            Annotation::Filename(a) => &a.text,
        }
    }
}

/// All annotations found in one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAnnotations {
    pub variables: Vec<VariableAnnotation>,
    pub regex_rules: Vec<RegexAnnotation>,
    pub enum_rules: Vec<EnumAnnotation>,
    pub filename: Option<FilenameAnnotation>,
}

impl FileAnnotations {
    /// Check if the file carries no annotations at all.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
            && self.regex_rules.is_empty()
            && self.enum_rules.is_empty()
            && self.filename.is_none()
    }
}

/// Parse one line. Each line carries at most one annotation; `var` wins over
/// `regex`, `regex` over `enum`, and `enum` over `filename`.
pub fn parse_line(text: &str, line: usize) -> Option<Annotation> {
    if let Some(caps) = VAR.captures(text) {
        return Some(Annotation::Variable(VariableAnnotation {
            name: caps[1].to_string(),
            var_type: VariableType::parse(&caps[2])?,
            required: &caps[3] == "required",
            description: caps.get(4).map(|m| m.as_str().to_string()),
            line,
            text: text.to_string(),
        }));
    }

    if let Some(caps) = REGEX.captures(text) {
        return Some(Annotation::Regex(RegexAnnotation {
            name: caps[1].to_string(),
            pattern: caps[2].to_string(),
            line,
            text: text.to_string(),
        }));
    }

    if let Some(caps) = ENUM.captures(text) {
        return Some(Annotation::Enum(EnumAnnotation {
            name: caps[1].to_string(),
            values: caps[2].split_whitespace().map(String::from).collect(),
            line,
            text: text.to_string(),
        }));
    }

    FILENAME.captures(text).map(|caps| {
        Annotation::Filename(FilenameAnnotation {
            templated_name: caps[1].trim().to_string(),
            line,
            text: text.to_string(),
        })
    })
}

/// Parse every annotation in a file.
///
/// A second `strata:filename` is an error naming both lines.
pub fn parse_annotations(content: &str) -> Result<FileAnnotations> {
    let mut annotations = FileAnnotations::default();

    for (index, text) in content.split('\n').enumerate() {
        match parse_line(text, index + 1) {
            Some(Annotation::Variable(a)) => annotations.variables.push(a),
            Some(Annotation::Regex(a)) => annotations.regex_rules.push(a),
            Some(Annotation::Enum(a)) => annotations.enum_rules.push(a),
            Some(Annotation::Filename(a)) => {
                if let Some(first) = &annotations.filename {
                    return Err(StrataError::AnnotationValidation {
                        errors: vec![format!(
                            "Multiple strata:filename annotations found (lines {} and {})",
                            first.line, a.line
                        )],
                    });
                }
                annotations.filename = Some(a);
            }
            None => {}
        }
    }

    Ok(annotations)
}

/// Default value for an annotated variable, read from its assignment.
///
/// The assignment is looked for on the annotation line first, then on the
/// line right after it. A literal that does not parse as the declared type
/// yields `None`.
pub fn extract_default(annotation: &VariableAnnotation, content: &str) -> Option<VariableValue> {
    let lines: Vec<&str> = content.split('\n').collect();
    let own = lines.get(annotation.line.checked_sub(1)?)?;

    if let Some(caps) = INLINE_ASSIGNMENT.captures(own) {
        return parse_default(&caps[1], annotation.var_type);
    }

    let next = lines.get(annotation.line)?;
    let assignment = Regex::new(&format!(
        r"\b{}\s*=\s*({LITERAL})[;,]?\s*(?:(?://|#).*)?$",
        regex::escape(&annotation.name)
    ))
    .ok()?;
    let caps = assignment.captures(next)?;
    parse_default(&caps[1], annotation.var_type)
}

/// Parse a literal as the declared type.
fn parse_default(literal: &str, var_type: VariableType) -> Option<VariableValue> {
    let literal = literal.trim().trim_end_matches([';', ',']).trim_end();

    match var_type {
        VariableType::String => {
            let quoted = (literal.len() >= 2)
                && ((literal.starts_with('"') && literal.ends_with('"'))
                    || (literal.starts_with('\'') && literal.ends_with('\'')));
            quoted.then(|| VariableValue::String(literal[1..literal.len() - 1].to_string()))
        }
        VariableType::Number => parse_number(literal).map(VariableValue::Number),
        VariableType::Boolean => match literal {
            "true" => Some(VariableValue::Bool(true)),
            "false" => Some(VariableValue::Bool(false)),
            _ => None,
        },
    }
}
