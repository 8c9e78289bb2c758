//! Diff command implementation.
//!
//! The `strata diff` command prints a layered template's patch: the files it
//! adds, removes and modifies relative to its parent.

use crate::cli::args::DiffArgs;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::layering::{FilePatch, PatchArtifact};
use crate::registry::Registry;
use crate::ui::{StrataTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The diff command implementation.
pub struct DiffCommand {
    config: EngineConfig,
    args: DiffArgs,
}

impl DiffCommand {
    pub fn new(config: EngineConfig, args: DiffArgs) -> Self {
        Self { config, args }
    }
}

impl Command for DiffCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);
        let entry = registry.resolve(&self.args.template)?;
        let Some(parent) = &entry.descriptor.parent else {
            ui.error(&format!("{} is a base template and has no patch", entry.id()));
            return Ok(CommandResult::failure(1));
        };

        let patch = PatchArtifact::read(&entry.source_path.join(&parent.patch_file))?;
        let parent_id = registry
            .find(&parent.reference())
            .map(|p| p.id())
            .unwrap_or_else(|| parent.reference());

        let theme = StrataTheme::new();
        ui.show_header(&format!("{} → {}", parent_id, entry.id()));
        for file in &patch.files {
            let (marker, style) = match file {
                FilePatch::Added { .. } => ("A", &theme.success),
                FilePatch::Removed { .. } => ("D", &theme.error),
                FilePatch::Modified { .. } => ("M", &theme.warning),
            };
            ui.message(&format!("  {} {}", style.apply_to(marker), file.path()));
        }

        let summary = patch.summary();
        ui.message(&format!(
            "  {}",
            theme.dim.apply_to(format!(
                "{} added, {} removed, {} modified",
                summary.added, summary.removed, summary.modified
            ))
        ));

        if !self.args.stat && !patch.is_empty() {
            ui.raw(patch.to_string().trim_end());
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrataError;
    use crate::registry::{RootKind, TemplateRoot};
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const PATCH: &str = "--- a/App.swift\n+++ b/App.swift\n@@ -1 +1 @@\n-base\n+child\n--- /dev/null\n+++ b/Login.swift\n@@ -0,0 +1 @@\n+login\n";

    fn setup() -> (TempDir, EngineConfig) {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base/1.0.0");
        fs::create_dir_all(base.join("template")).unwrap();
        fs::write(
            base.join("template.json"),
            r#"{"name":"base","version":"1.0.0","platform":"ios"}"#,
        )
        .unwrap();
        fs::write(base.join("template/App.swift"), "base\n").unwrap();

        let child = temp.path().join("child/1.0.0");
        fs::create_dir_all(&child).unwrap();
        fs::write(
            child.join("template.json"),
            r#"{"name":"child","version":"1.0.0","platform":"ios","extends":{"template":"base"}}"#,
        )
        .unwrap();
        fs::write(child.join("layer.patch"), PATCH).unwrap();

        let config =
            EngineConfig::new().with_root(TemplateRoot::new(temp.path(), 25, RootKind::Project));
        (temp, config)
    }

    fn args(template: &str, stat: bool) -> DiffArgs {
        DiffArgs {
            template: template.into(),
            stat,
        }
    }

    #[test]
    fn lists_files_and_prints_hunks() {
        let (_temp, config) = setup();
        let mut ui = MockUI::new();

        let result = DiffCommand::new(config, args("child", false))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.headers(), ["base@1.0.0 → child@1.0.0".to_string()]);
        assert!(ui.has_message("M App.swift"));
        assert!(ui.has_message("A Login.swift"));
        assert!(ui.has_message("1 added, 0 removed, 1 modified"));
        assert!(ui.raw_output().contains("+++ b/Login.swift"));
        assert!(ui.raw_output().contains("-base\n+child"));
    }

    #[test]
    fn stat_omits_hunks() {
        let (_temp, config) = setup();
        let mut ui = MockUI::new();

        DiffCommand::new(config, args("child@1.0.0", true))
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("A Login.swift"));
        assert!(ui.raw_output().is_empty());
    }

    #[test]
    fn base_template_has_no_patch() {
        let (_temp, config) = setup();
        let mut ui = MockUI::new();

        let result = DiffCommand::new(config, args("base", false))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("base@1.0.0 is a base template"));
    }

    #[test]
    fn missing_patch_file_is_an_error() {
        let (temp, config) = setup();
        fs::remove_file(temp.path().join("child/1.0.0/layer.patch")).unwrap();
        let mut ui = MockUI::new();

        let err = DiffCommand::new(config, args("child", false))
            .execute(&mut ui)
            .unwrap_err();
        assert!(matches!(err, StrataError::PatchMissing { .. }));
    }
}
