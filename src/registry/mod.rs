//! Template registry for Strata.
//!
//! This module discovers templates across several roots and resolves
//! references to them:
//! - Bundled templates (shipped next to the engine)
//! - `$STRATA_TEMPLATES_PATH`
//! - User templates (`~/.strata/templates/`)
//! - Project templates (`.strata/templates/`)
//!
//! # Resolution Order
//!
//! Roots are scanned highest priority first and each `name@version` is kept
//! from the first root defining it:
//! 1. Bundled (100)
//! 2. Environment (75)
//! 3. User (50)
//! 4. Project (25)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use strata::config::EngineConfig;
//! use strata::registry::Registry;
//!
//! let registry = Registry::new(&EngineConfig::from_env(Path::new(".")));
//! if let Some(entry) = registry.find("ios-base@latest") {
//!     println!("{} at {}", entry.id(), entry.source_path.display());
//! }
//! ```

pub mod chain;
pub mod discovery;
pub mod resolver;
pub mod roots;

pub use discovery::{discover, CatalogEntry, DiscoveryFilter};
pub use resolver::{Registry, TemplateInfo, TemplateRef};
pub use roots::{list_roots, RootKind, TemplateRoot};
