//! Rebuild a template's concrete tree from its ancestors.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::patch::PatchArtifact;
use super::tree::copy_tree;
use crate::error::{Result, StrataError};
use crate::registry::{CatalogEntry, Registry};
use crate::template::VARIABLES_FILE;

/// Materialize `entry` into `target`.
///
/// The root ancestor's `template/` tree and `variables.json` are copied first,
/// then every descendant patch is applied in order down to `entry` itself.
/// The full chain is resolved before anything is written.
pub fn materialize(registry: &Registry, entry: &CatalogEntry, target: &Path) -> Result<()> {
    let chain = registry.ancestor_chain(entry)?;
    let Some((root, layers)) = chain.split_first() else {
        return Ok(());
    };

    let files = root.template_dir();
    if !files.is_dir() {
        return Err(StrataError::TemplateFilesMissing { path: files });
    }

    fs::create_dir_all(target)?;
    let copied = copy_tree(&files, target)?;
    let schema = root.source_path.join(VARIABLES_FILE);
    if schema.is_file() {
        fs::copy(&schema, target.join(VARIABLES_FILE))?;
    }
    debug!("Copied {} file(s) from base {}", copied, root.id());

    for layer in layers {
        let Some(patch_path) = layer.patch_path() else {
            continue;
        };
        let patch = PatchArtifact::read(&patch_path)?;
        patch.apply(target)?;

        let summary = patch.summary();
        debug!(
            "Applied {} (+{} -{} ~{})",
            layer.id(),
            summary.added,
            summary.removed,
            summary.modified
        );
    }

    Ok(())
}
