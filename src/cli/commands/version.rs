//! Version command implementation.
//!
//! The `strata version` command copies a template to a new version directory.

use crate::cli::args::VersionArgs;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::layering::{create_version, VersionOptions};
use crate::registry::Registry;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The version command implementation.
pub struct VersionCommand {
    config: EngineConfig,
    args: VersionArgs,
}

impl VersionCommand {
    pub fn new(config: EngineConfig, args: VersionArgs) -> Self {
        Self { config, args }
    }
}

impl Command for VersionCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);

        // Default to the root the source version lives in.
        let out_root = match &self.args.out_root {
            Some(root) => root.clone(),
            None => {
                let reference = match &self.args.source_version {
                    Some(v) => format!("{}@{}", self.args.name, v),
                    None => self.args.name.clone(),
                };
                let source = registry.resolve(&reference)?;
                source
                    .source_path
                    .parent()
                    .and_then(|name_dir| name_dir.parent())
                    .map(|root| root.to_path_buf())
                    .unwrap_or_else(|| source.source_path.clone())
            }
        };

        let result = create_version(
            &registry,
            &VersionOptions {
                name: self.args.name.clone(),
                source_version: self.args.source_version.clone(),
                new_version: self.args.new_version.clone(),
                out_root,
            },
        )?;

        ui.success(&format!(
            "Created {}@{} from {} at {}",
            self.args.name,
            self.args.new_version,
            result.source,
            result.path.display()
        ));
        if result.layered {
            ui.show_hint(&format!(
                "Edit {} then run 'strata layer {}'",
                result.path.join("work").display(),
                result.path.display()
            ));
        }

        Ok(CommandResult::success())
    }
}
