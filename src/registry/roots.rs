//! Template roots.

use crate::config::EngineConfig;
use std::fmt;
use std::path::PathBuf;

/// Where a template root comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// Shipped with the engine
    Bundled,
    /// `$STRATA_TEMPLATES_PATH`
    Environment,
    /// `~/.strata/templates`
    User,
    /// `<project>/.strata/templates`
    Project,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RootKind::Bundled => "bundled",
            RootKind::Environment => "env",
            RootKind::User => "user",
            RootKind::Project => "project",
        };
        f.write_str(s)
    }
}

/// A directory scanned for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRoot {
    pub path: PathBuf,
    /// Higher wins when two roots define the same template
    pub priority: i32,
    pub kind: RootKind,
}

impl TemplateRoot {
    pub fn new(path: impl Into<PathBuf>, priority: i32, kind: RootKind) -> Self {
        Self {
            path: path.into(),
            priority,
            kind,
        }
    }
}

/// Existing roots, highest priority first.
///
/// Roots with equal priority keep their configured order.
pub fn list_roots(config: &EngineConfig) -> Vec<TemplateRoot> {
    let mut roots: Vec<TemplateRoot> = config
        .roots()
        .iter()
        .filter(|r| r.path.is_dir())
        .cloned()
        .collect();
    roots.sort_by(|a, b| b.priority.cmp(&a.priority));
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn list_roots_sorts_descending_and_drops_missing() {
        let temp = TempDir::new().unwrap();
        let low = temp.path().join("low");
        let high = temp.path().join("high");
        fs::create_dir_all(&low).unwrap();
        fs::create_dir_all(&high).unwrap();

        let config = EngineConfig::new()
            .with_root(TemplateRoot::new(&low, 25, RootKind::Project))
            .with_root(TemplateRoot::new(temp.path().join("missing"), 90, RootKind::User))
            .with_root(TemplateRoot::new(&high, 75, RootKind::Environment));

        let roots = list_roots(&config);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].path, high);
        assert_eq!(roots[1].path, low);
    }

    #[test]
    fn root_kind_display() {
        assert_eq!(RootKind::Environment.to_string(), "env");
        assert_eq!(RootKind::Bundled.to_string(), "bundled");
    }
}
