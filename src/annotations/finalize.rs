//! Turning an authored app into a base template.
//!
//! The authored tree stays a concrete, buildable app. Finalizing it:
//! 1. Scans text files for annotations
//! 2. Validates them per file and across files
//! 3. Writes `template/` with literals rewritten and files renamed
//! 4. Writes `variables.json` and `template.json`

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::parser::{extract_default, parse_annotations, FileAnnotations};
use super::rewrite::rewrite_content;
use super::validate::validate_annotations;
use crate::error::{Result, StrataError};
use crate::layering::tree::{native_path, relative_path};
use crate::template::{
    is_semver, validate_variables as validate_schema, RawDescriptor, TemplateDescriptor,
    TemplateVariable, VariableSchema, VariableValue, DESCRIPTOR_FILE, TEMPLATE_DIR,
    VARIABLES_FILE,
};

/// Directories never copied into a template.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "target", ".strata"];

/// File extensions scanned for annotations; everything else is copied as-is.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "swift", "ts", "tsx", "js", "jsx", "kt", "kts", "java", "m", "h", "xml", "plist", "json",
    "yaml", "yml", "md", "txt", "gradle", "rs", "py", "toml",
];

/// Inputs to [`finalize`].
#[derive(Debug, Clone)]
pub struct FinalizeOptions {
    /// Authored app to read
    pub work_dir: PathBuf,
    /// Version directory to write `template/`, `template.json`, `variables.json` into
    pub output_dir: PathBuf,
    pub name: String,
    pub platform: String,
    pub version: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Outcome of [`finalize`].
#[derive(Debug, Clone)]
pub struct FinalizeResult {
    pub descriptor: TemplateDescriptor,
    /// Original relative path to templated relative path
    pub renamed_files: BTreeMap<String, String>,
    pub variables: Vec<TemplateVariable>,
    pub files_written: usize,
}

/// Whether a file name has one of the scanned extensions.
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext))
}

/// Finalize an authored tree into a base template.
pub fn finalize(options: &FinalizeOptions) -> Result<FinalizeResult> {
    if !options.work_dir.is_dir() {
        return Err(StrataError::WorkDirMissing {
            path: options.work_dir.clone(),
        });
    }
    if !is_semver(&options.version) {
        return Err(StrataError::InvalidVersion {
            version: options.version.clone(),
        });
    }

    let template_out = options.output_dir.join(TEMPLATE_DIR);
    let files = authored_files(&options.work_dir, &template_out)?;
    let annotated = scan(&options.work_dir, &files)?;
    let variables = unified_schema(&options.work_dir, &annotated)?;

    let descriptor = RawDescriptor {
        name: options.name.clone(),
        version: options.version.clone(),
        platform: options.platform.clone(),
        description: options.description.clone(),
        tags: options.tags.clone(),
        ..Default::default()
    }
    .normalize()
    .map_err(|errors| StrataError::InvalidDescriptor {
        path: options.output_dir.join(DESCRIPTOR_FILE),
        errors,
    })?;

    if template_out.exists() {
        debug!("Replacing existing {}", template_out.display());
        fs::remove_dir_all(&template_out)?;
    }
    fs::create_dir_all(&template_out)?;

    let mut renamed_files = BTreeMap::new();
    for relative in &files {
        let source = native_path(&options.work_dir, relative);
        let annotations = annotated.get(relative);

        let target_relative = match annotations.and_then(|a| a.filename.as_ref()) {
            Some(filename) => {
                let renamed = match relative.rsplit_once('/') {
                    Some((dir, _)) => format!("{}/{}", dir, filename.templated_name),
                    None => filename.templated_name.clone(),
                };
                renamed_files.insert(relative.clone(), renamed.clone());
                renamed
            }
            None => relative.clone(),
        };

        let target = native_path(&template_out, &target_relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        match annotations {
            Some(annotations) => {
                let content = fs::read_to_string(&source)?;
                fs::write(&target, rewrite_content(&content, annotations))?;
            }
            None => {
                fs::copy(&source, &target)?;
            }
        }
    }

    VariableSchema {
        variables: variables.clone(),
    }
    .save(&options.output_dir.join(VARIABLES_FILE))?;
    fs::write(options.output_dir.join(DESCRIPTOR_FILE), descriptor.to_json()?)?;

    info!(
        "Finalized {} ({} file(s), {} variable(s))",
        descriptor.id(),
        files.len(),
        variables.len()
    );

    Ok(FinalizeResult {
        descriptor,
        renamed_files,
        variables,
        files_written: files.len(),
    })
}

/// Relative paths of every file to carry into the template, sorted.
fn authored_files(work_dir: &Path, template_out: &Path) -> Result<Vec<String>> {
    let walker = WalkDir::new(work_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.path() == template_out {
                return false;
            }
            !(e.file_type().is_dir()
                && SKIPPED_DIRS.contains(&e.file_name().to_string_lossy().as_ref()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(relative_path(work_dir, entry.path()));
        }
    }
    Ok(files)
}

/// Parse and validate annotations of every text file.
///
/// Problems from all files are gathered into one error, grouped by file.
fn scan(work_dir: &Path, files: &[String]) -> Result<BTreeMap<String, FileAnnotations>> {
    let mut annotated = BTreeMap::new();
    let mut errors = Vec::new();

    for relative in files {
        let path = native_path(work_dir, relative);
        if !is_text_file(&path) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            debug!("Not valid UTF-8, copying verbatim: {}", relative);
            continue;
        };

        let file_errors = match parse_annotations(&content) {
            Ok(annotations) => {
                let file_errors = validate_annotations(&annotations);
                if !annotations.is_empty() {
                    annotated.insert(relative.clone(), annotations);
                }
                file_errors
            }
            Err(StrataError::AnnotationValidation { errors }) => errors,
            Err(e) => return Err(e),
        };

        if !file_errors.is_empty() {
            errors.push(format!("In {}:", relative));
            errors.extend(file_errors.into_iter().map(|e| format!("  {}", e)));
        }
    }

    if errors.is_empty() {
        Ok(annotated)
    } else {
        Err(StrataError::AnnotationValidation { errors })
    }
}

/// Merge per-file declarations into one schema.
///
/// A variable may be declared in several files as long as the declarations
/// agree on type, regex, and enum values. The first declaration (by path)
/// provides the default; a later one may contribute a missing description.
fn unified_schema(
    work_dir: &Path,
    annotated: &BTreeMap<String, FileAnnotations>,
) -> Result<Vec<TemplateVariable>> {
    let mut order: Vec<String> = Vec::new();
    let mut variables: BTreeMap<String, TemplateVariable> = BTreeMap::new();
    let mut regex_rules: BTreeMap<String, String> = BTreeMap::new();
    let mut enum_rules: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut errors = Vec::new();

    for (relative, annotations) in annotated {
        let content = fs::read_to_string(native_path(work_dir, relative))?;

        for var in &annotations.variables {
            match variables.get_mut(&var.name) {
                Some(existing) => {
                    if existing.var_type != var.var_type {
                        errors.push(format!(
                            "Variable {} has conflicting types: {} vs {}",
                            var.name, existing.var_type, var.var_type
                        ));
                    }
                    if existing.description.is_none() {
                        existing.description = var.description.clone();
                    }
                }
                None => {
                    let mut variable =
                        TemplateVariable::new(&var.name, var.var_type, var.required);
                    variable.description = var.description.clone();
                    variable.default = extract_default(var, &content);
                    order.push(var.name.clone());
                    variables.insert(var.name.clone(), variable);
                }
            }
        }

        for rule in &annotations.regex_rules {
            match regex_rules.get(&rule.name) {
                Some(existing) if *existing != rule.pattern => errors.push(format!(
                    "Variable {} has conflicting regex patterns: {} vs {}",
                    rule.name, existing, rule.pattern
                )),
                Some(_) => {}
                None => {
                    regex_rules.insert(rule.name.clone(), rule.pattern.clone());
                }
            }
        }

        for rule in &annotations.enum_rules {
            match enum_rules.get(&rule.name) {
                Some(existing) => {
                    let a: BTreeSet<&String> = existing.iter().collect();
                    let b: BTreeSet<&String> = rule.values.iter().collect();
                    if a != b {
                        errors.push(format!(
                            "Variable {} has conflicting enum values: [{}] vs [{}]",
                            rule.name,
                            existing.join(", "),
                            rule.values.join(", ")
                        ));
                    }
                }
                None => {
                    enum_rules.insert(rule.name.clone(), rule.values.clone());
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(StrataError::AnnotationValidation { errors });
    }

    let unified: Vec<TemplateVariable> = order
        .into_iter()
        .filter_map(|name| {
            let mut variable = variables.remove(&name)?;
            variable.regex = regex_rules.remove(&name);
            variable.enum_values = enum_rules.remove(&name);
            Some(without_invalid_default(variable))
        })
        .collect();

    let errors = validate_schema(&unified);
    if !errors.is_empty() {
        return Err(StrataError::AnnotationValidation { errors });
    }
    Ok(unified)
}

/// Clear a string default that breaks its own regex or enum constraint.
fn without_invalid_default(mut variable: TemplateVariable) -> TemplateVariable {
    let Some(VariableValue::String(value)) = &variable.default else {
        return variable;
    };

    let matches_pattern = variable
        .regex
        .as_deref()
        .is_none_or(|pattern| Regex::new(pattern).is_ok_and(|re| re.is_match(value)));
    let allowed = variable
        .enum_values
        .as_ref()
        .is_none_or(|values| values.contains(value));

    if !(matches_pattern && allowed) {
        warn!(
            "Dropping default '{}' for {}: it violates the declared constraints",
            value, variable.name
        );
        variable.default = None;
    }
    variable
}
