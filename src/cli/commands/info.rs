//! Info command implementation.
//!
//! The `strata info` command shows a template's inheritance chain and the
//! variables it accepts.

use serde::Serialize;

use crate::cli::args::InfoArgs;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::registry::Registry;
use crate::template::TemplateVariable;
use crate::ui::{StrataTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The info command implementation.
pub struct InfoCommand {
    config: EngineConfig,
    args: InfoArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoJson<'a> {
    name: &'a str,
    version: String,
    platform: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    tags: &'a [String],
    path: String,
    inheritance_chain: &'a [String],
    variables: &'a [TemplateVariable],
}

impl InfoCommand {
    pub fn new(config: EngineConfig, args: InfoArgs) -> Self {
        Self { config, args }
    }
}

impl Command for InfoCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = Registry::new(&self.config);
        let info = registry.info(&self.args.template)?;
        let descriptor = &info.entry.descriptor;

        if self.args.json {
            let json = InfoJson {
                name: &descriptor.name,
                version: descriptor.version.to_string(),
                platform: &descriptor.platform,
                description: descriptor.description.as_deref(),
                tags: &descriptor.tags,
                path: info.entry.source_path.display().to_string(),
                inheritance_chain: &info.inheritance_chain,
                variables: &descriptor.variables,
            };
            ui.raw(&serde_json::to_string_pretty(&json)?);
            return Ok(CommandResult::success());
        }

        let theme = StrataTheme::new();
        ui.show_header(&info.entry.id());

        if let Some(description) = &descriptor.description {
            ui.message(&format!("  {}", theme.dim.apply_to(description)));
        }
        ui.message(&format!(
            "  {} {}",
            theme.key.apply_to("Platform:"),
            descriptor.platform
        ));
        if !descriptor.tags.is_empty() {
            ui.message(&format!(
                "  {} {}",
                theme.key.apply_to("Tags:"),
                descriptor.tags.join(", ")
            ));
        }
        ui.message(&format!(
            "  {} {}",
            theme.key.apply_to("Source:"),
            theme.dim.apply_to(info.entry.source_path.display())
        ));
        ui.message(&format!(
            "  {} {}",
            theme.key.apply_to("Chain:"),
            info.inheritance_chain.join(" → ")
        ));

        if descriptor.variables.is_empty() {
            return Ok(CommandResult::success());
        }

        ui.message("");
        ui.message(&format!("  {}", theme.key.apply_to("Variables:")));
        for var in &descriptor.variables {
            let mut detail = vec![var.var_type.to_string()];
            detail.push(if var.required { "required" } else { "optional" }.to_string());
            if let Some(default) = &var.default {
                detail.push(format!("default: {}", default));
            }
            if let Some(values) = &var.enum_values {
                detail.push(format!("one of: {}", values.join(", ")));
            }
            if let Some(pattern) = &var.regex {
                detail.push(format!("pattern: {}", pattern));
            }

            ui.message(&format!(
                "    {} {}",
                theme.highlight.apply_to(&var.name),
                theme.dim.apply_to(format!("({})", detail.join(", ")))
            ));
            if let Some(description) = &var.description {
                ui.message(&format!("      {}", theme.dim.apply_to(description)));
            }
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

    fn setup() -> (TempDir, EngineConfig) {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base/1.0.0");
        fs::create_dir_all(&base).unwrap();
        fs::write(
            base.join("template.json"),
            r#"{"name":"base","version":"1.0.0","platform":"ios","description":"Plain SwiftUI app"}"#,
        )
        .unwrap();
        fs::write(
            base.join("variables.json"),
            r#"{"variables":[{"name":"appName","type":"string","required":true,"description":"Display name"}]}"#,
        )
        .unwrap();

        let child = temp.path().join("login/2.0.0");
        fs::create_dir_all(&child).unwrap();
        fs::write(
            child.join("template.json"),
            r#"{"name":"login","version":"2.0.0","platform":"ios","basedOn":"base@1.0.0"}"#,
        )
        .unwrap();

        let config =
            EngineConfig::new().with_root(TemplateRoot::new(temp.path(), 25, RootKind::Project));
        (temp, config)
    }

    #[test]
    fn shows_chain_leaf_first() {
        let (_temp, config) = setup();
        let args = InfoArgs {
            template: "login".into(),
            json: false,
        };
        let mut ui = MockUI::new();

        let result = InfoCommand::new(config, args).execute(&mut ui).unwrap();
        assert!(result.success);
        assert_eq!(ui.headers(), ["login@2.0.0".to_string()]);
        assert!(ui.has_message("login@2.0.0 → base@1.0.0"));
    }

    #[test]
    fn json_includes_variables() {
        let (_temp, config) = setup();
        let args = InfoArgs {
            template: "base@1.0.0".into(),
            json: true,
        };
        let mut ui = MockUI::new();

        InfoCommand::new(config, args).execute(&mut ui).unwrap();
        let json: serde_json::Value = serde_json::from_str(&ui.raw_output()).unwrap();
        assert_eq!(json["variables"][0]["name"], "appName");
        assert_eq!(json["inheritanceChain"][0], "base@1.0.0");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let (_temp, config) = setup();
        let args = InfoArgs {
            template: "logn".into(),
            json: false,
        };
        let mut ui = MockUI::new();

        let err = InfoCommand::new(config, args).execute(&mut ui).unwrap_err();
        assert!(matches!(err, StrataError::TemplateNotFound { .. }));
        assert!(err.to_string().contains("login"));
    }
}
