//! Engine configuration.
//!
//! - [`EngineConfig`] captures where templates are discovered from
//! - Priorities and well-known directory names are exported as constants

pub mod engine;

pub use engine::{
    bundled_templates_dir, bundled_templates_dir_for, home_dir, EngineConfig, BUNDLED_PRIORITY,
    CONFIG_DIR, ENV_PRIORITY, PROJECT_PRIORITY, TEMPLATES_PATH_ENV, USER_PRIORITY,
};
