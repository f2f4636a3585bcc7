//! The declarative build description.
//!
//! A config names either a single `input` or a map of named `chunks`, plus
//! an optional `parent` directory that entry specifiers resolve against.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::validation::{ConfigValidator, SchemaValidator};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShearConfig {
    /// Single entry specifier. The chunk is named after the file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Named chunks, `name -> entry specifier`, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<IndexMap<String, String>>,

    /// Directory entry specifiers resolve against. Defaults to the current
    /// working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_builds: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_modules: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<usize>,
}

/// The entries a config declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entries<'a> {
    Single(&'a str),
    Chunks(&'a IndexMap<String, String>),
}

impl ShearConfig {
    /// Create from serde_json::Value (for programmatic config from DB/API)
    ///
    /// The result is schema-validated.
    ///
    /// # Example
    ///
    /// ```
    /// use shear_config::ShearConfig;
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "chunks": { "app": "./app.js", "admin": "./admin.js" },
    ///     "parent": "/project/src/"
    /// });
    ///
    /// let config = ShearConfig::from_value(value).unwrap();
    /// let names: Vec<&String> = config.chunks.as_ref().unwrap().keys().collect();
    /// assert_eq!(names, ["app", "admin"]);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let config: ShearConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
                field: "config".to_string(),
                hint: Some(e.to_string()),
            })?;
        SchemaValidator.validate(&config)?;
        Ok(config)
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|e| ConfigError::InvalidValue {
            field: "json".to_string(),
            hint: Some(format!("Invalid JSON: {}", e)),
        })?;
        Self::from_value(value)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let toml_val: toml::Value = toml::from_str(content).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("Invalid TOML syntax: {}", e)),
        })?;

        let value = serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("TOML to JSON conversion failed: {}", e)),
        })?;

        Self::from_value(value)
    }

    /// Load a config file, choosing the format from its extension.
    ///
    /// `.json` and `.toml` files are read whole. A `package.json` is read
    /// through its `shear` field.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading config");

        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return Self::from_package_json(&fs::read_to_string(path)?);
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&fs::read_to_string(path)?),
            Some("toml") => Self::from_toml_str(&fs::read_to_string(path)?),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub(crate) fn from_package_json(content: &str) -> Result<Self> {
        let parsed: Value = serde_json::from_str(content).map_err(|e| ConfigError::InvalidValue {
            field: "package.json".to_string(),
            hint: Some(format!("Invalid JSON: {}", e)),
        })?;

        let shear_value = parsed.get("shear").ok_or_else(|| ConfigError::InvalidValue {
            field: "shear".to_string(),
            hint: Some("Add a 'shear' field to your package.json".to_string()),
        })?;

        if shear_value.is_null() {
            return Err(ConfigError::InvalidValue {
                field: "shear".to_string(),
                hint: Some("The 'shear' field cannot be null".to_string()),
            });
        }

        Self::from_value(shear_value.clone())
    }

    /// The declared entries.
    ///
    /// Fails unless exactly one of `input` and `chunks` is set.
    pub fn entries(&self) -> Result<Entries<'_>> {
        match (&self.input, &self.chunks) {
            (Some(input), None) => Ok(Entries::Single(input)),
            (None, Some(chunks)) => Ok(Entries::Chunks(chunks)),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingEntries),
            (None, None) => Err(ConfigError::NoEntries),
        }
    }
}
