//! Pipeline configuration for `rechallenge.toml`.
//!
//! # Sections
//!
//! | Section               | Purpose                                        |
//! |-----------------------|------------------------------------------------|
//! | `[script]`            | Lowering target, JSX runtime, minification     |
//! | `[script.loop_guard]` | Loop guard mode and budget                     |
//! | `[style]`             | Embedded Sass compilation                      |
//!
//! Every field has a default, so an empty or missing file is a valid config.

mod error;
mod script;
mod style;

pub use error::ConfigError;
pub use script::{GuardMode, JsxRuntimeKind, LoopGuardConfig, ScriptConfig};
pub use style::{StyleConfig, StyleOutputStyle};

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Root configuration structure representing rechallenge.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Script transformer settings
    pub script: ScriptConfig,

    /// Style compiler settings
    pub style: StyleConfig,
}

impl Config {
    /// Load and validate a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::from_path(path)
        } else {
            crate::debug!("config"; "{} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text without validating it.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.script.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.script.target, "es2015");
        assert_eq!(config.script.loop_guard.limit, 100);
        assert_eq!(config.script.loop_guard.mode, GuardMode::Iterations);
        assert!(config.style.enable);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [script.loop_guard]
            mode = "millis"
            limit = 250

            [style]
            output = "compressed"
            "#,
        )
        .unwrap();
        assert_eq!(config.script.loop_guard.mode, GuardMode::Millis);
        assert_eq!(config.script.loop_guard.limit, 250);
        assert!(config.script.loop_guard.enable);
        assert_eq!(config.script.jsx_runtime, JsxRuntimeKind::Classic);
        assert_eq!(config.style.output, StyleOutputStyle::Compressed);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse("[script\ntarget = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_from_path_validates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[script.loop_guard]\nlimit = 0").unwrap();
        let err = Config::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("rechallenge.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_path(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
