//! Variable handling and rendering.
//!
//! - [`interpolation`] substitutes `{{name}}` placeholders
//! - [`variables`] applies defaults and validates values against a schema
//! - [`generate`](mod@generate) renders a materialized template into a project

pub mod generate;
pub mod interpolation;
pub mod variables;

pub use generate::{generate, GenerateOptions, GenerateResult};
pub use interpolation::{
    has_placeholders, parse_placeholders, placeholder_names, render_path, render_template,
    Segment,
};
pub use variables::{coerce_variables, merge_variables, validate_variables, ValidationReport};
