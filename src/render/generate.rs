//! Project generation from a template.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::interpolation::{render_path, render_template};
use super::variables::{coerce_variables, merge_variables, validate_variables};
use crate::error::{Result, StrataError};
use crate::layering::materialize;
use crate::layering::tree::{is_empty_dir, relative_path};
use crate::registry::Registry;
use crate::template::{TemplateVariable, VariableSchema, Variables, VARIABLES_FILE};

/// Inputs for [`generate`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// `name`, `name@latest`, or `name@version`
    pub template: String,
    pub output_dir: PathBuf,
    /// Supplied values; strings are converted to declared types where they parse
    pub variables: Variables,
    /// Write into a non-empty output directory, replacing files
    pub overwrite: bool,
}

/// Outcome of [`generate`].
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// `name@version` actually used
    pub template: String,
    /// Values after defaults were applied
    pub variables: Variables,
    /// Written files, relative to the output directory
    pub files: Vec<String>,
}

/// Materialize a template and render it into `output_dir`.
///
/// File and directory names are rendered as well as text contents. Files
/// that are not UTF-8 are copied unchanged. The schema file is not emitted.
pub fn generate(registry: &Registry, options: &GenerateOptions) -> Result<GenerateResult> {
    let entry = registry.resolve(&options.template)?;
    registry.ancestor_chain(entry)?;

    if !options.overwrite && !is_empty_dir(&options.output_dir)? {
        return Err(StrataError::OutputNotEmpty {
            path: options.output_dir.clone(),
        });
    }

    let scratch = tempfile::Builder::new()
        .prefix("strata-generate-")
        .tempdir()?;
    materialize(registry, entry, scratch.path())?;

    let schema = resolved_schema(scratch.path(), &entry.descriptor.variables)?;
    let supplied = coerce_variables(&schema, &options.variables);
    let values = merge_variables(&schema, &supplied);
    let report = validate_variables(&schema, &values);
    if !report.valid {
        return Err(StrataError::VariableValidation {
            errors: report.errors,
        });
    }

    let files = render_tree(scratch.path(), &options.output_dir, &values, options.overwrite)?;
    info!(
        "Generated {} file(s) from {} into {}",
        files.len(),
        entry.id(),
        options.output_dir.display()
    );

    Ok(GenerateResult {
        template: entry.id(),
        variables: values,
        files,
    })
}

/// The materialized schema file when present, else the descriptor's variables.
fn resolved_schema(tree: &Path, fallback: &[TemplateVariable]) -> Result<Vec<TemplateVariable>> {
    let path = tree.join(VARIABLES_FILE);
    if path.is_file() {
        Ok(VariableSchema::load(&path)?.variables)
    } else {
        Ok(fallback.to_vec())
    }
}

fn render_tree(
    source: &Path,
    output: &Path,
    values: &Variables,
    overwrite: bool,
) -> Result<Vec<String>> {
    let schema_file = source.join(VARIABLES_FILE);
    let mut planned = Vec::new();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || entry.path() == schema_file {
            continue;
        }

        let template_path = relative_path(source, entry.path());
        let rendered = template_path
            .split('/')
            .map(|segment| checked_segment(&template_path, render_path(segment, values)))
            .collect::<Result<Vec<_>>>()?;
        let target = rendered
            .iter()
            .fold(output.to_path_buf(), |path, segment| path.join(segment));

        if target.exists() && !overwrite {
            return Err(StrataError::FileExists { path: target });
        }
        planned.push((entry.into_path(), rendered.join("/"), target));
    }

    fs::create_dir_all(output)?;
    let mut written = Vec::with_capacity(planned.len());
    for (source_file, relative, target) in planned {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = fs::read(&source_file)
            .with_context(|| format!("Failed to read {}", source_file.display()))?;
        match String::from_utf8(bytes) {
            Ok(text) => fs::write(&target, render_template(&text, values))?,
            Err(binary) => fs::write(&target, binary.into_bytes())?,
        }
        debug!("Wrote {}", relative);
        written.push(relative);
    }

    Ok(written)
}

/// A rendered segment must name exactly one entry inside the output.
fn checked_segment(template_path: &str, segment: String) -> Result<String> {
    let problem = if segment.is_empty() {
        Some("a segment renders to an empty name".to_string())
    } else if segment == "." || segment == ".." {
        Some(format!("segment '{segment}' is not allowed"))
    } else if segment.contains(['/', '\\']) {
        Some(format!("segment '{segment}' contains a path separator"))
    } else {
        None
    };

    match problem {
        Some(message) => Err(StrataError::InvalidOutputPath {
            path: template_path.to_string(),
            message,
        }),
        None => Ok(segment),
    }
}
