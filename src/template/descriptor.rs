//! Template descriptor (`template.json`) schema.
//!
//! Two parent shapes are accepted on disk and normalized into [`ParentRef`]:
//!
//! ```json
//! { "extends": { "template": "ios-base", "version": "1.0.0", "patchFile": "layer.patch" } }
//! { "basedOn": "ios-base@1.0.0", "layer": { "patchFile": "layer.patch" } }
//! ```
//!
//! Descriptors are always written back in the `extends` shape.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::variable::TemplateVariable;

/// Patch file name used when a descriptor does not name one.
pub const DEFAULT_PATCH_FILE: &str = "layer.patch";

/// Sentinel accepted in place of a parent version.
pub const LATEST: &str = "latest";

/// Parent version selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Greatest version available at resolution time.
    Latest,
    /// One pinned version; never falls back to another.
    Exact(Version),
}

impl FromStr for VersionSpec {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == LATEST {
            Ok(VersionSpec::Latest)
        } else {
            Version::parse(s).map(VersionSpec::Exact)
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Latest => f.write_str(LATEST),
            VersionSpec::Exact(v) => write!(f, "{}", v),
        }
    }
}

/// Reference from a layered template to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    /// Parent template name
    pub template: String,
    /// Parent version selector
    pub version: VersionSpec,
    /// Patch file, relative to the child's template directory
    pub patch_file: String,
}

impl ParentRef {
    /// Lookup string understood by [`crate::registry::Registry::find`].
    pub fn reference(&self) -> String {
        match &self.version {
            VersionSpec::Latest => self.template.clone(),
            VersionSpec::Exact(v) => format!("{}@{}", self.template, v),
        }
    }
}

/// A fully normalized template descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDescriptor {
    pub name: String,
    pub version: Version,
    pub platform: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parent: Option<ParentRef>,
    pub variables: Vec<TemplateVariable>,
}

impl TemplateDescriptor {
    /// `name@version` identifier.
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Whether this template is expressed as a patch over a parent.
    pub fn is_layered(&self) -> bool {
        self.parent.is_some()
    }

    /// Look up a declared variable by name.
    pub fn variable(&self, name: &str) -> Option<&TemplateVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Convert into the on-disk representation.
    pub fn to_raw(&self) -> RawDescriptor {
        RawDescriptor {
            name: self.name.clone(),
            version: self.version.to_string(),
            platform: self.platform.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            extends: self.parent.as_ref().map(|p| RawExtends {
                template: p.template.clone(),
                version: Some(p.version.to_string()),
                patch_file: Some(p.patch_file.clone()),
            }),
            based_on: None,
            layer: None,
            variables: Vec::new(),
        }
    }

    /// Pretty JSON for `template.json`, newline terminated.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(&self.to_raw())?;
        json.push('\n');
        Ok(json)
    }
}

/// `template.json` exactly as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDescriptor {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub platform: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<RawExtends>,

    /// Legacy parent reference: `name` or `name@version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,

    /// Legacy patch location paired with `basedOn`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<RawLayer>,

    /// Inline variables; superseded by `variables.json` during discovery
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<TemplateVariable>,
}

/// `extends` block of a layered descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtends {
    pub template: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_file: Option<String>,
}

/// Legacy `layer` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLayer {
    pub patch_file: String,
}

impl RawDescriptor {
    /// Normalize into a [`TemplateDescriptor`].
    ///
    /// Returns every schema violation found; an `Ok` result is fully valid.
    pub fn normalize(self) -> Result<TemplateDescriptor, Vec<String>> {
        let mut errors = super::validator::validate_raw_descriptor(&self);
        errors.extend(super::validator::validate_variables(&self.variables));

        let version = Version::parse(&self.version);
        let parent = self.parent_ref();

        if let Err(e) = &parent {
            errors.push(e.clone());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TemplateDescriptor {
            name: self.name,
            version: version.map_err(|e| vec![format!("version: {}", e)])?,
            platform: self.platform,
            description: self.description,
            tags: self.tags,
            parent: parent.map_err(|e| vec![e])?,
            variables: self.variables,
        })
    }

    fn parent_ref(&self) -> Result<Option<ParentRef>, String> {
        if let Some(ext) = &self.extends {
            let version = ext
                .version
                .as_deref()
                .unwrap_or(LATEST)
                .parse::<VersionSpec>()
                .map_err(|e| format!("extends.version: {}", e))?;
            return Ok(Some(ParentRef {
                template: ext.template.clone(),
                version,
                patch_file: ext
                    .patch_file
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PATCH_FILE.to_string()),
            }));
        }

        if let Some(based_on) = &self.based_on {
            let (template, version) = match based_on.split_once('@') {
                Some((name, ver)) => (
                    name.to_string(),
                    ver.parse::<VersionSpec>()
                        .map_err(|e| format!("basedOn: {}", e))?,
                ),
                None => (based_on.clone(), VersionSpec::Latest),
            };
            return Ok(Some(ParentRef {
                template,
                version,
                patch_file: self
                    .layer
                    .as_ref()
                    .map(|l| l.patch_file.clone())
                    .unwrap_or_else(|| DEFAULT_PATCH_FILE.to_string()),
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<TemplateDescriptor, Vec<String>> {
        serde_json::from_str::<RawDescriptor>(json)
            .unwrap()
            .normalize()
    }

    #[test]
    fn base_descriptor_has_no_parent() {
        let d = parse(r#"{"name":"ios-base","version":"1.0.0","platform":"ios"}"#).unwrap();
        assert_eq!(d.id(), "ios-base@1.0.0");
        assert!(!d.is_layered());
    }

    #[test]
    fn extends_form_is_normalized() {
        let d = parse(
            r#"{"name":"child","version":"1.0.0","platform":"ios",
                "extends":{"template":"ios-base","version":"2.1.0","patchFile":"child.patch"}}"#,
        )
        .unwrap();
        let parent = d.parent.unwrap();
        assert_eq!(parent.template, "ios-base");
        assert_eq!(
            parent.version,
            VersionSpec::Exact(Version::new(2, 1, 0))
        );
        assert_eq!(parent.patch_file, "child.patch");
        assert_eq!(parent.reference(), "ios-base@2.1.0");
    }

    #[test]
    fn extends_without_version_means_latest() {
        let d = parse(
            r#"{"name":"child","version":"1.0.0","platform":"ios",
                "extends":{"template":"ios-base"}}"#,
        )
        .unwrap();
        let parent = d.parent.unwrap();
        assert_eq!(parent.version, VersionSpec::Latest);
        assert_eq!(parent.patch_file, DEFAULT_PATCH_FILE);
        assert_eq!(parent.reference(), "ios-base");
    }

    #[test]
    fn legacy_based_on_form_is_normalized() {
        let d = parse(
            r#"{"name":"child","version":"1.0.0","platform":"ios",
                "basedOn":"ios-base@1.2.3","layer":{"patchFile":"legacy.patch"}}"#,
        )
        .unwrap();
        let parent = d.parent.unwrap();
        assert_eq!(parent.reference(), "ios-base@1.2.3");
        assert_eq!(parent.patch_file, "legacy.patch");
    }

    #[test]
    fn invalid_parent_version_is_reported() {
        let errors = parse(
            r#"{"name":"child","version":"1.0.0","platform":"ios",
                "extends":{"template":"ios-base","version":"one"}}"#,
        )
        .unwrap_err();
        assert!(errors.iter().any(|e| e.contains("extends.version")));
    }

    #[test]
    fn serialization_uses_extends_shape() {
        let d = parse(
            r#"{"name":"child","version":"1.0.0","platform":"ios","basedOn":"ios-base"}"#,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&d.to_json().unwrap()).unwrap();
        assert_eq!(json["extends"]["template"], "ios-base");
        assert_eq!(json["extends"]["version"], "latest");
        assert!(json.get("basedOn").is_none());
    }
}
