//! Template lookup by name and version.
//!
//! References take three forms:
//! - `name` or `name@latest` - greatest semver among discovered versions
//! - `name@1.2.0` - that exact version, or nothing

use crate::config::EngineConfig;
use crate::error::{Result, StrataError};
use crate::registry::discovery::{discover, CatalogEntry, DiscoveryFilter};
use crate::registry::roots::{list_roots, TemplateRoot};
use crate::template::{TemplateDescriptor, VersionSpec};
use semver::Version;

/// A parsed `name[@version]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub name: String,
    /// `None` when the version suffix is not a valid semver.
    pub version: Option<VersionSpec>,
}

impl TemplateRef {
    pub fn parse(reference: &str) -> Self {
        match reference.split_once('@') {
            None => Self {
                name: reference.to_string(),
                version: Some(VersionSpec::Latest),
            },
            Some((name, version)) => Self {
                name: name.to_string(),
                version: version.parse().ok(),
            },
        }
    }
}

/// Summary of a template and its lineage.
#[derive(Debug, Clone)]
pub struct TemplateInfo<'a> {
    pub entry: &'a CatalogEntry,
    /// `name@version` ids from the template up to its root ancestor
    pub inheritance_chain: Vec<String>,
    pub required_variables: Vec<String>,
    pub optional_variables: Vec<String>,
}

/// In-memory catalog for one discovery pass.
#[derive(Debug, Clone)]
pub struct Registry {
    roots: Vec<TemplateRoot>,
    entries: Vec<CatalogEntry>,
}

impl Registry {
    /// Discover every template reachable from the configured roots.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_filter(config, &DiscoveryFilter::default())
    }

    /// Discover with a filter applied.
    pub fn with_filter(config: &EngineConfig, filter: &DiscoveryFilter) -> Self {
        let roots = list_roots(config);
        let entries = discover(&roots, filter);
        tracing::debug!(
            "Discovered {} template(s) across {} root(s)",
            entries.len(),
            roots.len()
        );
        Self { roots, entries }
    }

    /// Build a registry from pre-built entries (for testing).
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            roots: Vec::new(),
            entries,
        }
    }

    /// Existing roots, highest priority first.
    pub fn roots(&self) -> &[TemplateRoot] {
        &self.roots
    }

    /// All catalog entries in discovery order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Find a template by `name`, `name@latest`, or `name@version`.
    pub fn find(&self, reference: &str) -> Option<&CatalogEntry> {
        self.find_ref(&TemplateRef::parse(reference))
    }

    /// Find a template from a parsed reference.
    pub fn find_ref(&self, reference: &TemplateRef) -> Option<&CatalogEntry> {
        let mut candidates = self.entries.iter().filter(|e| e.name() == reference.name);
        match reference.version.as_ref()? {
            VersionSpec::Latest => candidates.max_by(|a, b| a.version().cmp(b.version())),
            VersionSpec::Exact(v) => candidates.find(|e| e.version() == v),
        }
    }

    /// Find a template or fail with a not-found error carrying suggestions.
    pub fn resolve(&self, reference: &str) -> Result<&CatalogEntry> {
        self.find(reference)
            .ok_or_else(|| StrataError::TemplateNotFound {
                reference: reference.to_string(),
                suggestions: self.suggest(&TemplateRef::parse(reference).name, 3),
            })
    }

    /// Descriptor for a reference, or a not-found error.
    pub fn get(&self, reference: &str) -> Result<&TemplateDescriptor> {
        self.resolve(reference).map(|e| &e.descriptor)
    }

    /// Check if a template reference resolves.
    pub fn has(&self, reference: &str) -> bool {
        self.find(reference).is_some()
    }

    /// All versions of a template, newest first.
    pub fn versions(&self, name: &str) -> Vec<&Version> {
        let mut versions: Vec<&Version> = self
            .entries
            .iter()
            .filter(|e| e.name() == name)
            .map(|e| e.version())
            .collect();
        versions.sort_by(|a, b| b.cmp(a));
        versions
    }

    /// Distinct template names, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(|e| e.name()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Case-insensitive match on name, description, or tags.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                let d = &e.descriptor;
                d.name.to_lowercase().contains(&query)
                    || d
                        .description
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&query))
                    || d.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Template names closest to `name`, best first.
    pub fn suggest(&self, name: &str, limit: usize) -> Vec<String> {
        let name = name.to_lowercase();
        let mut scored: Vec<(usize, &str)> = self
            .template_names()
            .into_iter()
            .filter(|candidate| *candidate != name)
            .map(|candidate| (edit_distance(&name, &candidate.to_lowercase()), candidate))
            .filter(|(distance, candidate)| {
                *distance <= (candidate.len().max(name.len()) / 3).max(1)
                    || candidate.to_lowercase().contains(&name)
            })
            .collect();
        scored.sort();
        scored
            .into_iter()
            .take(limit)
            .map(|(_, n)| n.to_string())
            .collect()
    }

    /// Describe a template, its inheritance chain, and its variables.
    pub fn info(&self, reference: &str) -> Result<TemplateInfo<'_>> {
        let entry = self.resolve(reference)?;
        let chain = self.ancestor_chain(entry)?;

        let (required, optional): (Vec<_>, Vec<_>) =
            entry.descriptor.variables.iter().partition(|v| v.required);

        Ok(TemplateInfo {
            entry,
            inheritance_chain: chain.iter().rev().map(|e| e.id()).collect(),
            required_variables: required.into_iter().map(|v| v.name.clone()).collect(),
            optional_variables: optional.into_iter().map(|v| v.name.clone()).collect(),
        })
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            current[j + 1] = (prev[j] + cost)
                .min(prev[j + 1] + 1)
                .min(current[j] + 1);
        }
        prev = current;
    }

    prev[b.len()]
}
