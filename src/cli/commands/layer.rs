//! Layer command implementation.
//!
//! The `strata layer` command regenerates a layered template's patch from its
//! `work/` tree.

use crate::cli::args::LayerArgs;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::layering::{create_layer, LayerOptions};
use crate::registry::Registry;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The layer command implementation.
pub struct LayerCommand {
    config: EngineConfig,
    args: LayerArgs,
}

impl LayerCommand {
    pub fn new(config: EngineConfig, args: LayerArgs) -> Self {
        Self { config, args }
    }
}

impl Command for LayerCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);
        let mut options = LayerOptions::new(&self.args.template_dir);
        if let Some(parent) = &self.args.parent {
            options = options.with_parent(parent);
        }

        let result = create_layer(&registry, &options)?;
        let summary = result.summary;

        if summary.total() == 0 {
            ui.warning(&format!(
                "{} is identical to {}; the patch is empty",
                result.child, result.parent
            ));
        }
        ui.success(&format!(
            "Wrote {} ({} added, {} removed, {} modified)",
            result.patch_path.display(),
            summary.added,
            summary.removed,
            summary.modified
        ));
        ui.message(&format!("  {} → {}", result.parent, result.child));

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RootKind, TemplateRoot};
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_patch_and_reports_counts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("templates");
        let base = root.join("base/1.0.0");
        fs::create_dir_all(base.join("template")).unwrap();
        fs::write(
            base.join("template.json"),
            r#"{"name":"base","version":"1.0.0","platform":"ios"}"#,
        )
        .unwrap();
        fs::write(base.join("template/App.swift"), "base\n").unwrap();

        let child = root.join("child/1.0.0");
        fs::create_dir_all(child.join("work")).unwrap();
        fs::write(
            child.join("template.json"),
            r#"{"name":"child","version":"1.0.0","platform":"ios","extends":{"template":"base"}}"#,
        )
        .unwrap();
        fs::write(child.join("work/App.swift"), "child\n").unwrap();

        let config = EngineConfig::new().with_root(TemplateRoot::new(&root, 25, RootKind::Project));
        let args = LayerArgs {
            template_dir: child.clone(),
            parent: None,
        };
        let mut ui = MockUI::new();

        let result = LayerCommand::new(config, args).execute(&mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_success("0 added, 0 removed, 1 modified"));
        assert!(ui.has_message("base@1.0.0 → child@1.0.0"));
        assert!(child.join("layer.patch").is_file());
    }
}
