//! File-based config discovery
//!
//! Handles finding and loading shear configuration files from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ShearConfig;
use crate::error::{ConfigError, Result};

/// Config file names, in lookup order.
const CONFIG_FILES: [&str; 2] = ["shear.toml", "shear.json"];

/// File-based configuration discovery
///
/// Library users with an in-memory config should use
/// [`ShearConfig::from_value`] directly.
///
/// # Example
///
/// ```no_run
/// use shear_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. shear.toml
    /// 2. shear.json
    /// 3. package.json (shear field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in CONFIG_FILES {
            let path = self.root.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.is_file() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("shear").is_some_and(|v| !v.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from the discovered file
    ///
    /// A config without `parent` gets the discovery root, so entries resolve
    /// next to the config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<ShearConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        let mut config = ShearConfig::load(&path)?;
        if config.parent.is_none() {
            config.parent = Some(self.root.clone());
        }
        Ok(config)
    }
}

/// Discover and load config from current directory (convenience function)
pub fn discover() -> Result<ShearConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(dir.path());
        assert!(discovery.find().is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(dir.path());
        assert!(matches!(discovery.load(), Err(ConfigError::NotFound)));
    }

    #[test]
    fn toml_wins_over_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("shear.json"), r#"{ "input": "./json.js" }"#).unwrap();
        fs::write(dir.path().join("shear.toml"), r#"input = "./toml.js""#).unwrap();

        let discovery = ConfigDiscovery::new(dir.path());
        assert_eq!(discovery.find().unwrap(), dir.path().join("shear.toml"));
        assert_eq!(discovery.load().unwrap().input.as_deref(), Some("./toml.js"));
    }

    #[test]
    fn package_json_with_null_field_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{ "shear": null }"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }
}
