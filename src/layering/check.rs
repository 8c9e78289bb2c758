//! Pre-publication checks for a template version directory.
//!
//! A check loads the descriptor and schema, rebuilds the concrete tree in a
//! scratch directory (copying `template/` or applying the layer patch over
//! the resolved parent), and compares the placeholders the tree uses with
//! the variables it declares.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use super::materialize::materialize;
use super::patch::PatchArtifact;
use super::tree::{copy_tree, relative_path};
use crate::error::{Result, StrataError};
use crate::registry::Registry;
use crate::render::placeholder_names;
use crate::template::{
    load_descriptor, schema_path, TemplateDescriptor, VariableSchema, TEMPLATE_DIR,
    VARIABLES_FILE,
};

/// Outcome of [`check_template`].
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// `name@version`, once the descriptor has loaded
    pub template: Option<String>,
    /// Problems that would break discovery, materialization or generation
    pub errors: Vec<String>,
    /// Suspicious but usable content
    pub warnings: Vec<String>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check the template in `template_dir` without modifying it.
///
/// Problems with the template are collected into the report. Only failures
/// of the scratch directory itself are returned as errors.
pub fn check_template(registry: &Registry, template_dir: &Path) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    let mut descriptor = match load_descriptor(template_dir) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            report.errors.extend(problems(e));
            return Ok(report);
        }
    };
    report.template = Some(descriptor.id());
    if let Some(path) = schema_path(template_dir) {
        match VariableSchema::load(&path) {
            Ok(schema) => descriptor.variables = schema.variables,
            Err(e) => {
                report.errors.extend(problems(e));
                return Ok(report);
            }
        }
    }

    let scratch = tempfile::Builder::new().prefix("strata-check-").tempdir()?;
    if let Err(message) = rebuild(registry, template_dir, &descriptor, scratch.path()) {
        report.errors.push(message);
        return Ok(report);
    }

    let schema = scratch.path().join(VARIABLES_FILE);
    let declared: BTreeSet<String> = if schema.is_file() {
        match VariableSchema::load(&schema) {
            Ok(loaded) => loaded.variables.into_iter().map(|v| v.name).collect(),
            Err(e) => {
                report.errors.extend(problems(e));
                return Ok(report);
            }
        }
    } else {
        descriptor.variables.iter().map(|v| v.name.clone()).collect()
    };

    let used = used_placeholders(scratch.path())?;
    for (name, file) in &used {
        if !declared.contains(name) {
            report.warnings.push(format!(
                "{{{{{}}}}} in {} is not a declared variable and renders empty",
                name, file
            ));
        }
    }
    for name in declared.iter().filter(|name| !used.contains_key(*name)) {
        report
            .warnings
            .push(format!("Variable '{}' is declared but never used", name));
    }

    debug!(
        "Checked {}: {} error(s), {} warning(s)",
        descriptor.id(),
        report.errors.len(),
        report.warnings.len()
    );
    Ok(report)
}

/// Individual messages of a load error.
fn problems(error: StrataError) -> Vec<String> {
    match error {
        StrataError::InvalidDescriptor { path, errors } => errors
            .into_iter()
            .map(|e| format!("{}: {}", path.display(), e))
            .collect(),
        other => vec![other.to_string()],
    }
}

/// Write the concrete tree of `descriptor` into `target`.
fn rebuild(
    registry: &Registry,
    template_dir: &Path,
    descriptor: &TemplateDescriptor,
    target: &Path,
) -> std::result::Result<(), String> {
    let Some(parent) = &descriptor.parent else {
        let files = template_dir.join(TEMPLATE_DIR);
        if !files.is_dir() {
            return Err(StrataError::TemplateFilesMissing { path: files }.to_string());
        }
        return copy_tree(&files, target).map(|_| ()).map_err(|e| e.to_string());
    };

    let patch = PatchArtifact::read(&template_dir.join(&parent.patch_file))
        .map_err(|e| e.to_string())?;
    let entry = registry
        .resolve(&parent.reference())
        .map_err(|e| e.to_string())?;
    materialize(registry, entry, target).map_err(|e| e.to_string())?;
    patch.apply(target).map_err(|e| e.to_string())
}

/// Placeholder names used in paths or text contents, each with the first
/// file that uses it.
fn used_placeholders(tree: &Path) -> Result<BTreeMap<String, String>> {
    let schema = tree.join(VARIABLES_FILE);
    let mut used = BTreeMap::new();

    for entry in WalkDir::new(tree).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || entry.path() == schema {
            continue;
        }
        let relative = relative_path(tree, entry.path());
        let mut names = placeholder_names(&relative);
        if let Ok(text) = String::from_utf8(fs::read(entry.path())?) {
            names.extend(placeholder_names(&text));
        }
        for name in names {
            used.entry(name).or_insert_with(|| relative.clone());
        }
    }

    Ok(used)
}
