//! List command implementation.
//!
//! The `strata list` command lists discovered templates or the roots they
//! were discovered in.

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::registry::{list_roots, DiscoveryFilter, Registry};
use crate::ui::{StrataTheme, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    config: EngineConfig,
    args: ListArgs,
}

#[derive(Serialize)]
struct TemplateRow<'a> {
    name: &'a str,
    version: String,
    platform: &'a str,
    root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    path: String,
}

#[derive(Serialize)]
struct RootRow {
    path: String,
    priority: i32,
    kind: String,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(config: EngineConfig, args: ListArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }

    fn list_roots(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let roots: Vec<RootRow> = list_roots(&self.config)
            .into_iter()
            .map(|r| RootRow {
                path: r.path.display().to_string(),
                priority: r.priority,
                kind: r.kind.to_string(),
            })
            .collect();

        if self.args.json {
            ui.raw(&serde_json::to_string_pretty(&roots)?);
            return Ok(CommandResult::success());
        }

        if roots.is_empty() {
            ui.message("No template roots exist.");
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["KIND", "PRIORITY", "PATH"]);
        for root in roots {
            table.add_row(vec![root.kind, root.priority.to_string(), root.path]);
        }
        for line in table.render() {
            ui.message(&line);
        }
        Ok(CommandResult::success())
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.roots {
            return self.list_roots(ui);
        }

        let filter = DiscoveryFilter {
            platform: self.args.platform.clone(),
        };
        let registry = Registry::with_filter(&self.config, &filter);

        let mut entries: Vec<_> = registry.entries().iter().collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()).then(b.version().cmp(a.version())));

        let rows: Vec<TemplateRow> = entries
            .iter()
            .map(|e| TemplateRow {
                name: e.name(),
                version: e.version().to_string(),
                platform: &e.descriptor.platform,
                root: e.root_kind.to_string(),
                extends: e.descriptor.parent.as_ref().map(|p| p.reference()),
                description: e.descriptor.description.as_deref(),
                path: e.source_path.display().to_string(),
            })
            .collect();

        if self.args.json {
            ui.raw(&serde_json::to_string_pretty(&rows)?);
            return Ok(CommandResult::success());
        }

        if rows.is_empty() {
            ui.message("No templates found.");
            ui.show_hint("Add templates under .strata/templates or set STRATA_TEMPLATES_PATH");
            return Ok(CommandResult::success());
        }

        let theme = StrataTheme::new();
        let mut table = Table::new(&["NAME", "VERSION", "PLATFORM", "ROOT", "EXTENDS"]);
        for row in &rows {
            table.add_row(vec![
                theme.highlight.apply_to(row.name).to_string(),
                theme.id.apply_to(&row.version).to_string(),
                row.platform.to_string(),
                row.root.clone(),
                theme
                    .dim
                    .apply_to(row.extends.as_deref().unwrap_or("-"))
                    .to_string(),
            ]);
        }
        for line in table.render() {
            ui.message(&line);
        }

        Ok(CommandResult::success())
    }
}
