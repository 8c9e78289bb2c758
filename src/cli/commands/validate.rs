//! Validate command implementation.
//!
//! The `strata validate` command checks a template directory: descriptor,
//! variable schema, concrete files or patch, and placeholder usage.

use crate::cli::args::ValidateArgs;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::layering::check_template;
use crate::registry::Registry;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The validate command implementation.
pub struct ValidateCommand {
    config: EngineConfig,
    args: ValidateArgs,
}

impl ValidateCommand {
    pub fn new(config: EngineConfig, args: ValidateArgs) -> Self {
        Self { config, args }
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);
        let report = check_template(&registry, &self.args.template_dir)?;
        let name = report
            .template
            .clone()
            .unwrap_or_else(|| self.args.template_dir.display().to_string());

        for warning in &report.warnings {
            ui.warning(warning);
        }

        if !report.is_valid() {
            ui.error(&format!("{} is not valid:", name));
            for error in &report.errors {
                ui.message(&format!("  - {}", error));
            }
            return Ok(CommandResult::failure(2));
        }

        ui.success(&format!("{} is valid", name));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RootKind, TemplateRoot};
    use crate::ui::MockUI;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn base(temp: &TempDir, variables: &str) -> PathBuf {
        let dir = temp.path().join("base/1.0.0");
        fs::create_dir_all(dir.join("template")).unwrap();
        fs::write(
            dir.join("template.json"),
            r#"{"name":"base","version":"1.0.0","platform":"ios"}"#,
        )
        .unwrap();
        fs::write(dir.join("variables.json"), variables).unwrap();
        fs::write(dir.join("template/README.md"), "# {{appName}}\n").unwrap();
        dir
    }

    fn run(temp: &TempDir, dir: PathBuf) -> (CommandResult, MockUI) {
        let config =
            EngineConfig::new().with_root(TemplateRoot::new(temp.path(), 25, RootKind::Project));
        let mut ui = MockUI::new();
        let result = ValidateCommand::new(config, ValidateArgs { template_dir: dir })
            .execute(&mut ui)
            .unwrap();
        (result, ui)
    }

    #[test]
    fn valid_template_succeeds() {
        let temp = TempDir::new().unwrap();
        let dir = base(
            &temp,
            r#"{"variables":[{"name":"appName","type":"string","required":true}]}"#,
        );

        let (result, ui) = run(&temp, dir);
        assert!(result.success);
        assert!(ui.has_success("base@1.0.0 is valid"));
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn schema_errors_exit_with_two() {
        let temp = TempDir::new().unwrap();
        let dir = base(
            &temp,
            r#"{"variables":[{"name":"appName","type":"string","required":true},{"name":"appName","type":"string","required":false}]}"#,
        );

        let (result, ui) = run(&temp, dir);
        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("base@1.0.0 is not valid"));
        assert!(ui.has_message("Duplicate variable 'appName'"));
    }

    #[test]
    fn undeclared_placeholder_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let dir = base(&temp, r#"{"variables":[]}"#);

        let (result, ui) = run(&temp, dir);
        assert!(result.success);
        assert!(ui.has_warning("{{appName}} in README.md"));
    }
}
