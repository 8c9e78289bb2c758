//! Error types for Strata operations.
//!
//! This module defines [`StrataError`], the primary error type used throughout
//! the engine, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Discovery problems never surface here: they are logged and the entry is skipped
//! - Everything triggered by an explicit action (layering, materializing,
//!   generating) fails fast with one of the categorized variants below
//! - Use `anyhow::Error` (via `StrataError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Strata operations.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Template descriptor file not found at expected location.
    #[error("Template descriptor not found at {path}")]
    DescriptorNotFound { path: PathBuf },

    /// Failed to parse a descriptor or schema file.
    #[error("Failed to parse {path}: {message}")]
    DescriptorParse { path: PathBuf, message: String },

    /// Descriptor parsed but violates the schema.
    #[error("Invalid template at {path}:\n  {}", .errors.join("\n  "))]
    InvalidDescriptor { path: PathBuf, errors: Vec<String> },

    /// Referenced template (or pinned version) does not exist.
    #[error("Template not found: {reference}{}", format_suggestions(.suggestions))]
    TemplateNotFound {
        reference: String,
        suggestions: Vec<String>,
    },

    /// Layer creation without a parent reference.
    #[error("No parent template specified for '{template}'. Pass a parent or set 'extends' in template.json")]
    NoParentSpecified { template: String },

    /// Parent reference does not resolve.
    #[error("Parent template not found: {reference} (required by '{child}')")]
    ParentNotFound { reference: String, child: String },

    /// Inheritance chain loops back on itself.
    #[error("Cycle detected in template chain: {chain}")]
    CycleDetected { chain: String },

    /// Layered template without a work/ tree.
    #[error("Work directory not found at {path}. Layered templates are edited in work/, not template/")]
    WorkDirMissing { path: PathBuf },

    /// Base template without a template/ tree.
    #[error("Template files not found at {path}")]
    TemplateFilesMissing { path: PathBuf },

    /// Layered template whose patch file is absent.
    #[error("Layer patch file not found at {path}")]
    PatchMissing { path: PathBuf },

    /// Patch text could not be parsed.
    #[error("Malformed patch at line {line}: {message}")]
    PatchParse { line: usize, message: String },

    /// Patch does not apply cleanly to the materialized parent.
    #[error("Patch does not apply to '{file}': {message}")]
    PatchApply { file: String, message: String },

    /// Authored annotations are inconsistent.
    #[error("Annotation validation failed:\n{}", .errors.join("\n"))]
    AnnotationValidation { errors: Vec<String> },

    /// Supplied variables violate the template schema.
    #[error("Variable validation failed:\n  {}", .errors.join("\n  "))]
    VariableValidation { errors: Vec<String> },

    /// Output directory has content and overwrite was not requested.
    #[error("Output directory is not empty: {path}. Use --overwrite to replace existing files")]
    OutputNotEmpty { path: PathBuf },

    /// A file would be clobbered during generation.
    #[error("File already exists: {path}. Use --overwrite to replace existing files")]
    FileExists { path: PathBuf },

    /// A rendered path segment would leave the output directory or is empty.
    #[error("Invalid output path '{path}': {message}")]
    InvalidOutputPath { path: String, message: String },

    /// Version string is not `X.Y.Z`.
    #[error("Invalid version '{version}': must be semver format (e.g. 1.0.0)")]
    InvalidVersion { version: String },

    /// Target version directory already exists.
    #[error("Version {version} of {template} already exists at {path}")]
    VersionExists {
        template: String,
        version: String,
        path: PathBuf,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// Result type alias for Strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;
