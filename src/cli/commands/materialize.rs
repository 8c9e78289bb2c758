//! Materialize command implementation.
//!
//! The `strata materialize` command writes a template's concrete tree, with
//! placeholders intact, so it can be inspected or copied into a new layer's
//! `work/` directory.

use crate::cli::args::MaterializeArgs;
use crate::config::EngineConfig;
use crate::error::{Result, StrataError};
use crate::layering::materialize;
use crate::layering::tree::is_empty_dir;
use crate::registry::Registry;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The materialize command implementation.
pub struct MaterializeCommand {
    config: EngineConfig,
    args: MaterializeArgs,
}

impl MaterializeCommand {
    pub fn new(config: EngineConfig, args: MaterializeArgs) -> Self {
        Self { config, args }
    }
}

impl Command for MaterializeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);
        let entry = registry.resolve(&self.args.template)?;

        if !is_empty_dir(&self.args.output)? {
            return Err(StrataError::OutputNotEmpty {
                path: self.args.output.clone(),
            });
        }

        materialize(&registry, entry, &self.args.output)?;

        ui.success(&format!(
            "Materialized {} into {}",
            entry.id(),
            self.args.output.display()
        ));
        Ok(CommandResult::success())
    }
}
