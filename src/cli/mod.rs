//! Command-line interface for Strata.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, DiffArgs, FinalizeArgs, GenerateArgs, InfoArgs, LayerArgs, ListArgs,
    MaterializeArgs, TestArgs, ValidateArgs, VersionArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
