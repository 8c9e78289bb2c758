//! Template discovery across roots.
//!
//! Discovery never fails as a whole: a malformed descriptor or schema file is
//! logged and the entry is skipped so the rest of the catalog stays usable.

use crate::error::Result;
use crate::registry::roots::{RootKind, TemplateRoot};
use crate::template::{
    self, is_semver, TemplateDescriptor, VariableSchema, DESCRIPTOR_FILE, TEMPLATE_DIR, WORK_DIR,
};
use semver::Version;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A discovered template.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub descriptor: TemplateDescriptor,
    /// Version directory holding `template.json`
    pub source_path: PathBuf,
    pub root_kind: RootKind,
}

impl CatalogEntry {
    /// `name@version`
    pub fn id(&self) -> String {
        self.descriptor.id()
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn version(&self) -> &Version {
        &self.descriptor.version
    }

    /// Concrete tree of a base template.
    pub fn template_dir(&self) -> PathBuf {
        self.source_path.join(TEMPLATE_DIR)
    }

    /// Working tree of a layered template.
    pub fn work_dir(&self) -> PathBuf {
        self.source_path.join(WORK_DIR)
    }

    /// Patch file of a layered template.
    pub fn patch_path(&self) -> Option<PathBuf> {
        self.descriptor
            .parent
            .as_ref()
            .map(|p| self.source_path.join(&p.patch_file))
    }
}

/// Optional discovery filters.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter {
    /// Only keep templates for this platform
    pub platform: Option<String>,
}

impl DiscoveryFilter {
    pub fn platform(platform: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
        }
    }

    fn accepts(&self, descriptor: &TemplateDescriptor) -> bool {
        match &self.platform {
            Some(p) => descriptor.platform == *p,
            None => true,
        }
    }
}

/// Scan roots (already in priority order) for templates.
///
/// Layout: `<root>/<name>/<version>/template.json`. Each `(name, version)`
/// pair is kept from the first root that defines it; distinct versions of a
/// name are all kept.
pub fn discover(roots: &[TemplateRoot], filter: &DiscoveryFilter) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    let mut seen: HashSet<(String, Version)> = HashSet::new();

    for root in roots {
        debug!("Scanning template root {} ({})", root.path.display(), root.kind);

        let walker = WalkDir::new(&root.path)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name();

        for dir in walker {
            let dir = match dir {
                Ok(d) => d,
                Err(e) => {
                    warn!("Could not access template root {}: {}", root.path.display(), e);
                    continue;
                }
            };
            if !dir.file_type().is_dir() || !dir.path().join(DESCRIPTOR_FILE).is_file() {
                continue;
            }

            let version_dir = dir.file_name().to_string_lossy();
            if !is_semver(&version_dir) {
                warn!(
                    "Invalid version directory at {}: version must be semver (e.g. 1.0.0)",
                    dir.path().display()
                );
                continue;
            }

            let descriptor = match load_entry(dir.path()) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping template at {}: {}", dir.path().display(), e);
                    continue;
                }
            };

            if descriptor.version.to_string() != version_dir {
                warn!(
                    "Skipping template at {}: descriptor version {} does not match directory",
                    dir.path().display(),
                    descriptor.version
                );
                continue;
            }

            if !filter.accepts(&descriptor) {
                continue;
            }

            let key = (descriptor.name.clone(), descriptor.version.clone());
            if seen.insert(key) {
                entries.push(CatalogEntry {
                    descriptor,
                    source_path: dir.path().to_path_buf(),
                    root_kind: root.kind,
                });
            } else {
                debug!(
                    "{}@{} in {} is shadowed by a higher-priority root",
                    descriptor.name,
                    descriptor.version,
                    root.path.display()
                );
            }
        }
    }

    entries
}

/// Load one descriptor and its schema; schema problems only downgrade to a warning.
fn load_entry(version_dir: &Path) -> Result<TemplateDescriptor> {
    let mut descriptor = template::load_descriptor(version_dir)?;

    if let Some(path) = template::schema_path(version_dir) {
        match VariableSchema::load(&path) {
            Ok(schema) => descriptor.variables = schema.variables,
            Err(e) => {
                warn!("Invalid variables file at {}: {}", path.display(), e);
                descriptor.variables = Vec::new();
            }
        }
    }

    Ok(descriptor)
}
