//! Generate command implementation.
//!
//! The `strata generate` command renders a template into a new project.

use crate::cli::args::GenerateArgs;
use crate::config::EngineConfig;
use crate::error::{Result, StrataError};
use crate::registry::Registry;
use crate::render::{generate, GenerateOptions};
use crate::template::{VariableValue, Variables};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The generate command implementation.
pub struct GenerateCommand {
    config: EngineConfig,
    args: GenerateArgs,
}

impl GenerateCommand {
    pub fn new(config: EngineConfig, args: GenerateArgs) -> Self {
        Self { config, args }
    }

    fn supplied_variables(&self) -> Variables {
        self.args
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), VariableValue::from(v.as_str())))
            .collect()
    }
}

impl Command for GenerateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);
        let options = GenerateOptions {
            template: self.args.template.clone(),
            output_dir: self.args.output.clone(),
            variables: self.supplied_variables(),
            overwrite: self.args.overwrite,
        };

        let result = match generate(&registry, &options) {
            Ok(result) => result,
            Err(StrataError::VariableValidation { errors }) => {
                ui.error("Variable validation failed:");
                for error in &errors {
                    ui.message(&format!("  - {}", error));
                }
                ui.show_hint(&format!(
                    "Run 'strata info {}' to see accepted variables",
                    self.args.template
                ));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if ui.output_mode().shows_details() {
            for file in &result.files {
                ui.message(&format!("  {}", file));
            }
        }
        ui.success(&format!(
            "Generated {} file(s) from {} into {}",
            result.files.len(),
            result.template,
            self.args.output.display()
        ));

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RootKind, TemplateRoot};
    use crate::ui::{MockUI, OutputMode};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, EngineConfig) {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("templates/base/1.0.0");
        fs::create_dir_all(base.join("template")).unwrap();
        fs::write(
            base.join("template.json"),
            r#"{"name":"base","version":"1.0.0","platform":"ios"}"#,
        )
        .unwrap();
        fs::write(
            base.join("variables.json"),
            r#"{"variables":[{"name":"appName","type":"string","required":true}]}"#,
        )
        .unwrap();
        fs::write(base.join("template/README.md"), "# {{appName}}\n").unwrap();

        let config = EngineConfig::new().with_root(TemplateRoot::new(
            temp.path().join("templates"),
            25,
            RootKind::Project,
        ));
        (temp, config)
    }

    fn args(temp: &TempDir, vars: &[(&str, &str)]) -> GenerateArgs {
        GenerateArgs {
            template: "base".into(),
            output: temp.path().join("out"),
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            overwrite: false,
        }
    }

    #[test]
    fn generates_project() {
        let (temp, config) = setup();
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        let result = GenerateCommand::new(config, args(&temp, &[("appName", "Demo")]))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_success("Generated 1 file(s) from base@1.0.0"));
        assert!(ui.has_message("README.md"));
        assert_eq!(
            fs::read_to_string(temp.path().join("out/README.md")).unwrap(),
            "# Demo\n"
        );
    }

    #[test]
    fn validation_failure_lists_errors() {
        let (temp, config) = setup();
        let mut ui = MockUI::new();

        let result = GenerateCommand::new(config, args(&temp, &[]))
            .execute(&mut ui)
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
        assert!(ui.has_message("Required variable 'appName' is missing"));
        assert!(ui.has_hint("strata info base"));
    }
}
