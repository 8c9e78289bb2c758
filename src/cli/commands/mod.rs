//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands build their own
//! [`Registry`](crate::registry::Registry) from the dispatcher's
//! [`EngineConfig`](crate::config::EngineConfig), so every invocation sees a
//! fresh discovery pass.

pub mod diff;
pub mod dispatcher;
pub mod finalize;
pub mod generate;
pub mod info;
pub mod layer;
pub mod list;
pub mod materialize;
pub mod test;
pub mod validate;
pub mod version;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
