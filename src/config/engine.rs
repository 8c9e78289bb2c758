//! Engine configuration.
//!
//! Global process state (environment root, home directory, project directory)
//! is captured once into an [`EngineConfig`] and handed to the registry.
//! Nothing below this layer reads the environment.

use crate::registry::roots::{RootKind, TemplateRoot};
use std::path::{Path, PathBuf};

/// Environment variable naming an extra template root.
pub const TEMPLATES_PATH_ENV: &str = "STRATA_TEMPLATES_PATH";

/// Per-user and per-project configuration directory name.
pub const CONFIG_DIR: &str = ".strata";

/// Priority of the templates shipped with the engine.
pub const BUNDLED_PRIORITY: i32 = 100;
/// Priority of the environment-configured root.
pub const ENV_PRIORITY: i32 = 75;
/// Priority of `~/.strata/templates`.
pub const USER_PRIORITY: i32 = 50;
/// Priority of `<project>/.strata/templates`.
pub const PROJECT_PRIORITY: i32 = 25;

/// Candidate template roots for one engine instance.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    roots: Vec<TemplateRoot>,
}

impl EngineConfig {
    /// Configuration with no roots at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard root set from the process environment.
    ///
    /// Roots (highest priority first):
    /// 1. Bundled templates next to the crate
    /// 2. `$STRATA_TEMPLATES_PATH`
    /// 3. `~/.strata/templates`
    /// 4. `<project_dir>/.strata/templates`
    pub fn from_env(project_dir: &Path) -> Self {
        let env_root = std::env::var_os(TEMPLATES_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::standard(Some(bundled_templates_dir()), env_root, home_dir(), project_dir)
    }

    /// Build the standard root set from explicit locations.
    pub fn standard(
        bundled: Option<PathBuf>,
        env_root: Option<PathBuf>,
        home: Option<PathBuf>,
        project_dir: &Path,
    ) -> Self {
        let mut config = Self::new();

        if let Some(path) = bundled {
            config = config.with_root(TemplateRoot::new(path, BUNDLED_PRIORITY, RootKind::Bundled));
        }
        if let Some(path) = env_root {
            config = config.with_root(TemplateRoot::new(path, ENV_PRIORITY, RootKind::Environment));
        }
        if let Some(home) = home {
            config = config.with_root(TemplateRoot::new(
                home.join(CONFIG_DIR).join("templates"),
                USER_PRIORITY,
                RootKind::User,
            ));
        }
        config.with_root(TemplateRoot::new(
            project_dir.join(CONFIG_DIR).join("templates"),
            PROJECT_PRIORITY,
            RootKind::Project,
        ))
    }

    /// Builder: add a root.
    pub fn with_root(mut self, root: TemplateRoot) -> Self {
        self.roots.push(root);
        self
    }

    /// All configured roots, whether or not they exist.
    pub fn roots(&self) -> &[TemplateRoot] {
        &self.roots
    }
}

/// The current user's home directory, if known.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Templates directory shipped with the running binary.
///
/// See [`bundled_templates_dir_for`]; the executable path comes from
/// [`std::env::current_exe`].
pub fn bundled_templates_dir() -> PathBuf {
    bundled_templates_dir_for(std::env::current_exe().ok().as_deref())
}

/// Templates directory shipped with the executable at `exe`.
///
/// Looks in order at:
/// 1. `<exe dir>/templates` (unpacked archive)
/// 2. `<exe dir>/../share/strata/templates` (installed prefix)
/// 3. the crate's own `templates/` (running from a source checkout)
///
/// The first existing directory wins. With none present the source
/// checkout path is returned and discovery simply finds nothing there.
pub fn bundled_templates_dir_for(exe: Option<&Path>) -> PathBuf {
    let source_checkout = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");

    let mut candidates = Vec::new();
    if let Some(exe_dir) = exe.and_then(Path::parent) {
        candidates.push(exe_dir.join("templates"));
        if let Some(prefix) = exe_dir.parent() {
            candidates.push(prefix.join("share").join("strata").join("templates"));
        }
    }

    candidates
        .into_iter()
        .find(|dir| dir.is_dir())
        .unwrap_or(source_checkout)
}
