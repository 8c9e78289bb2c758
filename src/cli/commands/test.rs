//! Test command implementation.
//!
//! The `strata test` command generates a template using its defaults plus
//! any `--var` values, so authors can see that the whole chain materializes
//! and renders. Without `--output` the project goes into a scratch
//! directory that is removed afterwards.

use crate::cli::args::TestArgs;
use crate::config::EngineConfig;
use crate::error::{Result, StrataError};
use crate::registry::Registry;
use crate::render::{generate, GenerateOptions};
use crate::template::{VariableValue, Variables};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The test command implementation.
pub struct TestCommand {
    config: EngineConfig,
    args: TestArgs,
}

impl TestCommand {
    pub fn new(config: EngineConfig, args: TestArgs) -> Self {
        Self { config, args }
    }
}

impl Command for TestCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);
        let scratch = tempfile::Builder::new().prefix("strata-test-").tempdir()?;
        let output_dir = self
            .args
            .output
            .clone()
            .unwrap_or_else(|| scratch.path().join("project"));

        let options = GenerateOptions {
            template: self.args.template.clone(),
            output_dir,
            variables: self
                .args
                .vars
                .iter()
                .map(|(k, v)| (k.clone(), VariableValue::from(v.as_str())))
                .collect::<Variables>(),
            overwrite: false,
        };

        let result = match generate(&registry, &options) {
            Ok(result) => result,
            Err(StrataError::VariableValidation { errors }) => {
                ui.error(&format!(
                    "{} does not generate with its defaults:",
                    self.args.template
                ));
                for error in &errors {
                    ui.message(&format!("  - {}", error));
                }
                ui.show_hint("Add defaults to the schema or pass values with --var");
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if ui.output_mode().shows_details() {
            for (name, value) in &result.variables {
                ui.message(&format!("  {} = {}", name, value));
            }
            for file in &result.files {
                ui.message(&format!("  {}", file));
            }
        }

        match &self.args.output {
            Some(output) => ui.success(&format!(
                "{} rendered {} file(s) into {}",
                result.template,
                result.files.len(),
                output.display()
            )),
            None => ui.success(&format!(
                "{} rendered {} file(s)",
                result.template,
                result.files.len()
            )),
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RootKind, TemplateRoot};
    use crate::ui::{MockUI, OutputMode};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(required_default: Option<&str>) -> (TempDir, EngineConfig) {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("templates/base/1.0.0");
        fs::create_dir_all(base.join("template")).unwrap();
        fs::write(
            base.join("template.json"),
            r#"{"name":"base","version":"1.0.0","platform":"ios"}"#,
        )
        .unwrap();
        let default = required_default
            .map(|d| format!(r#","default":"{d}""#))
            .unwrap_or_default();
        fs::write(
            base.join("variables.json"),
            format!(
                r#"{{"variables":[{{"name":"appName","type":"string","required":true{default}}}]}}"#
            ),
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

    fn args(output: Option<PathBuf>, vars: &[(&str, &str)]) -> TestArgs {
        TestArgs {
            template: "base".into(),
            output,
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn renders_with_defaults_into_scratch() {
        let (_temp, config) = setup(Some("Sample"));
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        let result = TestCommand::new(config, args(None, &[]))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_success("base@1.0.0 rendered 1 file(s)"));
        assert!(ui.has_message("appName = Sample"));
        assert!(ui.has_message("README.md"));
    }

    #[test]
    fn keeps_output_when_asked() {
        let (temp, config) = setup(Some("Sample"));
        let out = temp.path().join("kept");
        let mut ui = MockUI::new();

        TestCommand::new(config, args(Some(out.clone()), &[("appName", "Given")]))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(fs::read_to_string(out.join("README.md")).unwrap(), "# Given\n");
    }

    #[test]
    fn missing_required_value_exits_with_two() {
        let (_temp, config) = setup(None);
        let mut ui = MockUI::new();

        let result = TestCommand::new(config, args(None, &[]))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("base does not generate with its defaults"));
        assert!(ui.has_message("Required variable 'appName' is missing"));
    }
}
