//! Copy a template to a new version directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use super::materialize::materialize;
use super::tree::copy_tree;
use crate::error::{Result, StrataError};
use crate::registry::{CatalogEntry, Registry};
use crate::template::{is_semver, DESCRIPTOR_FILE, TEMPLATE_DIR, VARIABLES_FILE, WORK_DIR};

const README_FILE: &str = "README.md";

/// Inputs for [`create_version`].
#[derive(Debug, Clone)]
pub struct VersionOptions {
    pub name: String,
    /// Version to copy from; the latest when unset
    pub source_version: Option<String>,
    pub new_version: String,
    /// Root the new `<name>/<new_version>` directory is created under
    pub out_root: PathBuf,
}

/// Outcome of [`create_version`].
#[derive(Debug, Clone)]
pub struct VersionResult {
    /// `name@version` copied from
    pub source: String,
    pub path: PathBuf,
    pub layered: bool,
}

/// Create `<out_root>/<name>/<new_version>` from an existing version.
///
/// The descriptor is copied as stored with only `version` replaced. Base
/// templates take their `template/` tree and schema along. Layered templates
/// take their patch, and `work/` is rebuilt by materializing the source
/// version so it can be edited straight away.
pub fn create_version(registry: &Registry, options: &VersionOptions) -> Result<VersionResult> {
    if !is_semver(&options.new_version) {
        return Err(StrataError::InvalidVersion {
            version: options.new_version.clone(),
        });
    }

    let reference = match &options.source_version {
        Some(v) => format!("{}@{}", options.name, v),
        None => options.name.clone(),
    };
    let source = registry.resolve(&reference)?;

    let new_dir = options.out_root.join(&options.name).join(&options.new_version);
    if new_dir.exists() {
        return Err(StrataError::VersionExists {
            template: options.name.clone(),
            version: options.new_version.clone(),
            path: new_dir,
        });
    }

    fs::create_dir_all(&new_dir)?;
    if let Err(e) = populate(registry, source, &new_dir, &options.new_version) {
        if let Err(cleanup) = fs::remove_dir_all(&new_dir) {
            warn!("Could not remove {}: {}", new_dir.display(), cleanup);
        }
        return Err(e);
    }

    let layered = source.descriptor.is_layered();
    info!(
        "Created {}@{} from {}",
        options.name,
        options.new_version,
        source.id()
    );

    Ok(VersionResult {
        source: source.id(),
        path: new_dir,
        layered,
    })
}

fn populate(
    registry: &Registry,
    source: &CatalogEntry,
    new_dir: &Path,
    new_version: &str,
) -> Result<()> {
    write_descriptor(
        &source.source_path.join(DESCRIPTOR_FILE),
        &new_dir.join(DESCRIPTOR_FILE),
        new_version,
    )?;
    copy_if_present(&source.source_path.join(README_FILE), &new_dir.join(README_FILE))?;

    if let Some(patch_path) = source.patch_path() {
        let file_name = patch_path
            .strip_prefix(&source.source_path)
            .unwrap_or(&patch_path);
        let target = new_dir.join(file_name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        copy_if_present(&patch_path, &target)?;
        materialize(registry, source, &new_dir.join(WORK_DIR))?;
    } else {
        let files = source.template_dir();
        if !files.is_dir() {
            return Err(StrataError::TemplateFilesMissing { path: files });
        }
        copy_tree(&files, &new_dir.join(TEMPLATE_DIR))?;
        copy_if_present(
            &source.source_path.join(VARIABLES_FILE),
            &new_dir.join(VARIABLES_FILE),
        )?;
    }

    Ok(())
}

/// Rewrite `template.json` with a new version, keeping every other field as
/// stored.
fn write_descriptor(src: &Path, dst: &Path, version: &str) -> Result<()> {
    let content = fs::read_to_string(src)
        .with_context(|| format!("Failed to read {}", src.display()))?;
    let mut raw: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| StrataError::DescriptorParse {
            path: src.to_path_buf(),
            message: e.to_string(),
        })?;

    if let Some(object) = raw.as_object_mut() {
        object.insert("version".to_string(), version.into());
    }

    let mut json = serde_json::to_string_pretty(&raw)?;
    json.push('\n');
    fs::write(dst, json)?;
    Ok(())
}

fn copy_if_present(src: &Path, dst: &Path) -> Result<()> {
    if src.is_file() {
        fs::copy(src, dst)?;
    }
    Ok(())
}
