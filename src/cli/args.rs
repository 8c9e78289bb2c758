//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strata - layered app templates.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project directory whose .strata/templates is searched (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Extra template root
    #[arg(long, global = true, value_name = "DIR", env = "STRATA_TEMPLATES_PATH")]
    pub templates_path: Option<PathBuf>,

    /// Show per-file detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List discovered templates
    List(ListArgs),

    /// Show a template's lineage and variables
    Info(InfoArgs),

    /// Generate a project from a template
    Generate(GenerateArgs),

    /// Write a template's concrete file tree
    Materialize(MaterializeArgs),

    /// Record a layered template's work/ tree as a patch over its parent
    Layer(LayerArgs),

    /// Turn an annotated app into a base template
    Finalize(FinalizeArgs),

    /// Copy a template to a new version
    Version(VersionArgs),

    /// Show a layered template's patch over its parent
    Diff(DiffArgs),

    /// Check a template directory before publishing it
    Validate(ValidateArgs),

    /// Generate a template with its defaults into a scratch directory
    Test(TestArgs),
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Only templates for this platform
    #[arg(long)]
    pub platform: Option<String>,

    /// Show the template roots instead of templates
    #[arg(long)]
    pub roots: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command.
#[derive(Debug, Clone, clap::Args)]
pub struct InfoArgs {
    /// Template reference: name, name@latest, or name@version
    pub template: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `generate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct GenerateArgs {
    /// Template reference: name, name@latest, or name@version
    pub template: String,

    /// Directory to generate into
    pub output: PathBuf,

    /// Variable value as key=value (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Write into a non-empty directory, replacing files
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the `materialize` command.
#[derive(Debug, Clone, clap::Args)]
pub struct MaterializeArgs {
    /// Template reference: name, name@latest, or name@version
    pub template: String,

    /// Empty or missing directory to write into
    pub output: PathBuf,
}

/// Arguments for the `layer` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LayerArgs {
    /// Version directory of the layered template (holds template.json and work/)
    pub template_dir: PathBuf,

    /// Parent reference, overriding the descriptor's `extends`
    #[arg(long)]
    pub parent: Option<String>,
}

/// Arguments for the `finalize` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FinalizeArgs {
    /// Annotated app to read
    pub work_dir: PathBuf,

    /// Version directory to write template.json, variables.json and template/ into
    #[arg(short, long)]
    pub output: PathBuf,

    /// Template name
    #[arg(long)]
    pub name: String,

    /// Target platform (e.g. ios, android)
    #[arg(long)]
    pub platform: String,

    /// Template version
    #[arg(long, default_value = "1.0.0")]
    pub template_version: String,

    /// Short description
    #[arg(long)]
    pub description: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Arguments for the `version` command.
#[derive(Debug, Clone, clap::Args)]
pub struct VersionArgs {
    /// Template name
    pub name: String,

    /// Version to create
    pub new_version: String,

    /// Version to copy from (defaults to the latest)
    #[arg(long = "from", value_name = "VERSION")]
    pub source_version: Option<String>,

    /// Root to create <name>/<version> under (defaults to the source template's root)
    #[arg(long, value_name = "DIR")]
    pub out_root: Option<PathBuf>,
}

/// Arguments for the `diff` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DiffArgs {
    /// Template reference: name, name@latest, or name@version
    pub template: String,

    /// Only show changed files, not hunks
    #[arg(long)]
    pub stat: bool,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ValidateArgs {
    /// Version directory of the template (holds template.json)
    pub template_dir: PathBuf,
}

/// Arguments for the `test` command.
#[derive(Debug, Clone, clap::Args)]
pub struct TestArgs {
    /// Template reference: name, name@latest, or name@version
    pub template: String,

    /// Keep the generated project here instead of a removed scratch directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Variable value as key=value (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,
}

/// Parse a `key=value` pair.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
