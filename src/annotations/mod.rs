//! Annotation-driven template authoring.
//!
//! Template authors keep a concrete, buildable app and mark the values that
//! should become variables with comments:
//!
//! ```swift
//! let appName = "BaseApp" // strata:var appName string required "App name"
//! ```
//!
//! - [`parser`] reads annotations and the literal defaults they sit next to
//! - [`rewrite`] turns those literals into `{{name}}` placeholders
//! - [`validate`] checks one file's annotations for consistency
//! - [`finalize`](mod@finalize) converts a whole authored tree into a base template

pub mod finalize;
pub mod parser;
pub mod rewrite;
pub mod validate;

pub use finalize::{finalize, FinalizeOptions, FinalizeResult};
pub use parser::{
    extract_default, parse_annotations, parse_line, Annotation, EnumAnnotation, FileAnnotations,
    FilenameAnnotation, RegexAnnotation, VariableAnnotation,
};
pub use rewrite::{placeholder, rewrite_content, rewrite_line};
pub use validate::validate_annotations;
