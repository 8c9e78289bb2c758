//! Strata - layered app templates.
//!
//! A base template is a concrete app tree with `{{name}}` placeholders. A
//! layered template stores only a unified-diff patch over its parent, so a
//! family of templates (`ios-base` → `ios-login` → `ios-login-oauth`) shares
//! one source of truth.
//!
//! # Modules
//!
//! - [`annotations`] - Turning annotated apps into base templates
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Where templates are discovered from
//! - [`error`] - Error types and result aliases
//! - [`layering`] - Diffing, patching, and materializing layered templates
//! - [`registry`] - Template discovery and version resolution
//! - [`render`] - Variable validation and placeholder substitution
//! - [`template`] - Descriptor and variable schema model
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use strata::config::EngineConfig;
//! use strata::registry::Registry;
//! use strata::render::{generate, GenerateOptions};
//! use strata::template::{VariableValue, Variables};
//!
//! let config = EngineConfig::from_env(Path::new("."));
//! let registry = Registry::new(&config);
//! let options = GenerateOptions {
//!     template: "ios-base".into(),
//!     output_dir: "MyApp".into(),
//!     variables: Variables::from([("appName".to_string(), VariableValue::from("MyApp"))]),
//!     overwrite: false,
//! };
//! let result = generate(&registry, &options)?;
//! println!("wrote {} files", result.files.len());
//! # Ok::<(), strata::StrataError>(())
//! ```

pub mod annotations;
pub mod cli;
pub mod config;
pub mod error;
pub mod layering;
pub mod registry;
pub mod render;
pub mod template;
pub mod ui;

pub use error::{Result, StrataError};
