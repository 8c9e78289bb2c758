//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{bundled_templates_dir, home_dir, EngineConfig};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config: EngineConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher with roots derived from the process environment.
    pub fn new(project_root: PathBuf, templates_path: Option<PathBuf>) -> Self {
        let config = match templates_path {
            Some(path) => EngineConfig::standard(
                Some(bundled_templates_dir()),
                Some(path),
                home_dir(),
                &project_root,
            ),
            None => EngineConfig::from_env(&project_root),
        };
        Self::with_config(project_root, config)
    }

    /// Create a dispatcher with explicit roots.
    pub fn with_config(project_root: PathBuf, config: EngineConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.config.clone();
        match &cli.command {
            Commands::List(args) => super::list::ListCommand::new(config, args.clone()).execute(ui),
            Commands::Info(args) => super::info::InfoCommand::new(config, args.clone()).execute(ui),
            Commands::Generate(args) => {
                super::generate::GenerateCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Materialize(args) => {
                super::materialize::MaterializeCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Layer(args) => {
                super::layer::LayerCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Finalize(args) => {
                super::finalize::FinalizeCommand::new(args.clone()).execute(ui)
            }
            Commands::Version(args) => {
                super::version::VersionCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Diff(args) => super::diff::DiffCommand::new(config, args.clone()).execute(ui),
            Commands::Validate(args) => {
                super::validate::ValidateCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Test(args) => super::test::TestCommand::new(config, args.clone()).execute(ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RootKind;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn templates_path_becomes_environment_root() {
        let temp = TempDir::new().unwrap();
        let dispatcher =
            CommandDispatcher::new(temp.path().to_path_buf(), Some(PathBuf::from("/extra")));

        let env_root = dispatcher
            .config()
            .roots()
            .iter()
            .find(|r| r.kind == RootKind::Environment)
            .unwrap();
        assert_eq!(env_root.path, PathBuf::from("/extra"));
        assert_eq!(dispatcher.project_root(), temp.path());
    }

    #[test]
    fn dispatches_list_with_empty_config() {
        let temp = TempDir::new().unwrap();
        let dispatcher =
            CommandDispatcher::with_config(temp.path().to_path_buf(), EngineConfig::new());
        let cli = Cli::parse_from(["strata", "list"]);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_message("No templates found"));
    }
}
