//! Layer creation: record a child's `work/` tree as a patch over its parent.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::materialize::materialize;
use super::patch::{PatchArtifact, PatchSummary};
use super::tree::{snapshot, TreeSnapshot};
use crate::error::{Result, StrataError};
use crate::registry::{CatalogEntry, Registry};
use crate::template::{load_descriptor, DEFAULT_PATCH_FILE, VARIABLES_FILE, WORK_DIR};

/// Prefix of the scratch directory holding a materialized layered parent.
const SCRATCH_PREFIX: &str = "strata-layer-";

/// Inputs for [`create_layer`].
#[derive(Debug, Clone)]
pub struct LayerOptions {
    /// Version directory of the child template
    pub template_dir: PathBuf,
    /// Parent reference overriding the descriptor's `extends`
    pub parent: Option<String>,
    /// Where scratch directories are created; the system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl LayerOptions {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            parent: None,
            scratch_dir: None,
        }
    }

    /// Builder: use this parent instead of the descriptor's.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder: create scratch directories under `dir`.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}

/// Outcome of [`create_layer`].
#[derive(Debug, Clone)]
pub struct LayerResult {
    pub patch_path: PathBuf,
    /// `name@version` of the child
    pub child: String,
    /// `name@version` of the resolved parent
    pub parent: String,
    pub summary: PatchSummary,
}

/// Diff the child's `work/` tree against its resolved parent and write the
/// patch file.
///
/// Output depends only on the two trees, so re-running on unchanged inputs
/// writes a byte-identical patch.
pub fn create_layer(registry: &Registry, options: &LayerOptions) -> Result<LayerResult> {
    let descriptor = load_descriptor(&options.template_dir)?;

    let reference = match (&options.parent, &descriptor.parent) {
        (Some(reference), _) => reference.clone(),
        (None, Some(parent)) => parent.reference(),
        (None, None) => {
            return Err(StrataError::NoParentSpecified {
                template: descriptor.name.clone(),
            })
        }
    };

    let parent = registry
        .find(&reference)
        .ok_or_else(|| StrataError::ParentNotFound {
            reference: reference.clone(),
            child: descriptor.id(),
        })?;

    let work_dir = options.template_dir.join(WORK_DIR);
    if !work_dir.is_dir() {
        return Err(StrataError::WorkDirMissing { path: work_dir });
    }

    let parent_tree = parent_snapshot(registry, parent, options.scratch_dir.as_deref())?;
    let child_tree = snapshot(&work_dir)?;
    let patch = PatchArtifact::between(&parent_tree, &child_tree)?;

    let patch_file = descriptor
        .parent
        .as_ref()
        .map(|p| p.patch_file.as_str())
        .unwrap_or(DEFAULT_PATCH_FILE);
    let patch_path = options.template_dir.join(patch_file);
    patch.write(&patch_path)?;

    let summary = patch.summary();
    info!(
        "Created layer {} over {} ({} file(s) changed)",
        descriptor.id(),
        parent.id(),
        summary.total()
    );

    Ok(LayerResult {
        patch_path,
        child: descriptor.id(),
        parent: parent.id(),
        summary,
    })
}

/// Concrete tree of a parent: `template/` plus schema for a base template,
/// a scratch materialization for a layered one.
fn parent_snapshot(
    registry: &Registry,
    parent: &CatalogEntry,
    scratch_dir: Option<&Path>,
) -> Result<TreeSnapshot> {
    if parent.descriptor.is_layered() {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let scratch = match scratch_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        debug!(
            "Materializing {} into {}",
            parent.id(),
            scratch.path().display()
        );
        materialize(registry, parent, scratch.path())?;
        return snapshot(scratch.path());
    }

    let files = parent.template_dir();
    if !files.is_dir() {
        return Err(StrataError::TemplateFilesMissing { path: files });
    }
    let mut tree = snapshot(&files)?;

    let schema = parent.source_path.join(VARIABLES_FILE);
    if schema.is_file() {
        tree.insert(VARIABLES_FILE.to_string(), fs::read(&schema)?);
    }
    Ok(tree)
}
