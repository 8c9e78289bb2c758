//! Template descriptors, variable schemas, and their on-disk layout.
//!
//! A template lives in a version directory:
//!
//! ```text
//! <root>/<name>/<version>/template.json        descriptor
//! <root>/<name>/<version>/variables.json       finalized variable schema
//! <root>/<name>/<version>/template/            concrete tree (base templates)
//! <root>/<name>/<version>/work/                working tree (layered templates)
//! <root>/<name>/<version>/work/variables.json  in-progress schema
//! <root>/<name>/<version>/layer.patch          patch over the parent
//! ```

pub mod descriptor;
pub mod validator;
pub mod variable;

pub use descriptor::{
    ParentRef, RawDescriptor, TemplateDescriptor, VersionSpec, DEFAULT_PATCH_FILE, LATEST,
};
pub use validator::{is_semver, validate_raw_descriptor, validate_variables};
pub use variable::{TemplateVariable, VariableType, VariableValue, Variables};

use crate::error::{StrataError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Descriptor file name.
pub const DESCRIPTOR_FILE: &str = "template.json";
/// Variable schema file name.
pub const VARIABLES_FILE: &str = "variables.json";
/// Concrete tree of a base template.
pub const TEMPLATE_DIR: &str = "template";
/// Working tree of a layered template.
pub const WORK_DIR: &str = "work";

/// Contents of `variables.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSchema {
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

impl VariableSchema {
    /// Load and validate a schema file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let schema: VariableSchema =
            serde_json::from_str(&content).map_err(|e| StrataError::DescriptorParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let errors = validate_variables(&schema.variables);
        if !errors.is_empty() {
            return Err(StrataError::InvalidDescriptor {
                path: path.to_path_buf(),
                errors,
            });
        }
        Ok(schema)
    }

    /// Write the schema as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }
}

/// Schema file to load for a template directory.
///
/// The in-progress `work/variables.json` wins over the finalized file.
pub fn schema_path(template_dir: &Path) -> Option<PathBuf> {
    [
        template_dir.join(WORK_DIR).join(VARIABLES_FILE),
        template_dir.join(VARIABLES_FILE),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

/// Load and validate `template.json` from a template directory.
///
/// Variables are taken from the descriptor itself; use [`load_template`] to
/// also merge in the schema file.
pub fn load_descriptor(template_dir: &Path) -> Result<TemplateDescriptor> {
    let path = template_dir.join(DESCRIPTOR_FILE);
    if !path.is_file() {
        return Err(StrataError::DescriptorNotFound { path });
    }

    let content = fs::read_to_string(&path)?;
    let raw: RawDescriptor =
        serde_json::from_str(&content).map_err(|e| StrataError::DescriptorParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

    raw.normalize()
        .map_err(|errors| StrataError::InvalidDescriptor { path, errors })
}

/// Load a descriptor together with its variable schema.
pub fn load_template(template_dir: &Path) -> Result<TemplateDescriptor> {
    let mut descriptor = load_descriptor(template_dir)?;
    if let Some(path) = schema_path(template_dir) {
        descriptor.variables = VariableSchema::load(&path)?.variables;
    }
    Ok(descriptor)
}
