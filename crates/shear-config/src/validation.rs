//! Pluggable config validation strategies

use crate::config::{Entries, ShearConfig};
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &ShearConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// Entry specifiers are not resolved here; the bundler reports resolution
/// failures per chunk.
///
/// # Example
///
/// ```
/// use shear_config::{ConfigValidator, SchemaValidator, ShearConfig};
///
/// let config = ShearConfig {
///     input: Some("./main.js".into()),
///     ..ShearConfig::default()
/// };
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &ShearConfig) -> Result<()> {
        match config.entries()? {
            Entries::Single(input) => check_specifier("input", input)?,
            Entries::Chunks(chunks) => {
                if chunks.is_empty() {
                    return Err(ConfigError::NoEntries);
                }
                for (name, entry) in chunks {
                    if name.trim().is_empty() {
                        return Err(ConfigError::SchemaValidation {
                            message: "chunk names cannot be empty".to_string(),
                            hint: Some("Give every entry in 'chunks' a name".to_string()),
                        });
                    }
                    check_specifier(name, entry)?;
                }
            }
        }

        for (field, value) in [
            ("maxParallelBuilds", config.max_parallel_builds),
            ("maxModules", config.max_modules),
            ("maxFileSize", config.max_file_size),
        ] {
            if value == Some(0) {
                return Err(ConfigError::SchemaValidation {
                    message: format!("{field} must be greater than 0"),
                    hint: Some(format!("Remove '{field}' to use the default")),
                });
            }
        }

        Ok(())
    }
}

fn check_specifier(name: &str, specifier: &str) -> Result<()> {
    if specifier.trim().is_empty() {
        return Err(ConfigError::SchemaValidation {
            message: format!("entry for '{name}' cannot be empty"),
            hint: Some("Use a relative path such as './src/main.js'".to_string()),
        });
    }
    Ok(())
}

/// Validate a config's schema (convenience function)
pub fn validate_schema(config: &ShearConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn chunks(entries: &[(&str, &str)]) -> ShearConfig {
        let map: IndexMap<String, String> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ShearConfig {
            chunks: Some(map),
            ..ShearConfig::default()
        }
    }

    #[test]
    fn empty_chunk_map_has_no_entries() {
        assert!(matches!(
            validate_schema(&chunks(&[])),
            Err(ConfigError::NoEntries)
        ));
    }

    #[test]
    fn empty_specifier_is_rejected() {
        let err = validate_schema(&chunks(&[("app", "  ")])).unwrap_err();
        assert!(err.to_string().contains("'app'"));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = chunks(&[("app", "./app.js")]);
        config.max_parallel_builds = Some(0);
        assert!(matches!(
            validate_schema(&config),
            Err(ConfigError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn valid_chunks_pass() {
        validate_schema(&chunks(&[("app", "./app.js"), ("admin", "./admin.js")])).unwrap();
    }
}
