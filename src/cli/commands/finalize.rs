//! Finalize command implementation.
//!
//! The `strata finalize` command turns an annotated, buildable app into a
//! base template.

use crate::annotations::{finalize, FinalizeOptions};
use crate::cli::args::FinalizeArgs;
use crate::error::{Result, StrataError};
use crate::ui::{StrataTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The finalize command implementation.
pub struct FinalizeCommand {
    args: FinalizeArgs,
}

impl FinalizeCommand {
    pub fn new(args: FinalizeArgs) -> Self {
        Self { args }
    }

    fn options(&self) -> FinalizeOptions {
        FinalizeOptions {
            work_dir: self.args.work_dir.clone(),
            output_dir: self.args.output.clone(),
            name: self.args.name.clone(),
            platform: self.args.platform.clone(),
            version: self.args.template_version.clone(),
            description: self.args.description.clone(),
            tags: self.args.tags.clone(),
        }
    }
}

impl Command for FinalizeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let result = match finalize(&self.options()) {
            Ok(result) => result,
            Err(StrataError::AnnotationValidation { errors }) => {
                ui.error("Annotation validation failed:");
                for error in &errors {
                    ui.message(error);
                }
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let theme = StrataTheme::new();
        ui.success(&format!(
            "Finalized {} ({} file(s), {} variable(s))",
            result.descriptor.id(),
            result.files_written,
            result.variables.len()
        ));

        for var in &result.variables {
            ui.message(&format!(
                "  {} {}",
                theme.highlight.apply_to(&var.name),
                theme.dim.apply_to(format!(
                    "({}, {})",
                    var.var_type,
                    if var.required { "required" } else { "optional" }
                ))
            ));
        }
        for (from, to) in &result.renamed_files {
            ui.message(&format!("  {} {} {}", from, theme.dim.apply_to("→"), to));
        }

        Ok(CommandResult::success())
    }
}
