//! `[script]` section: JS/JSX transpilation.
//!
//! # Example
//!
//! ```toml
//! [script]
//! target = "es2015"
//! jsx_runtime = "classic"
//! jsx_pragma = "React.createElement"
//! jsx_pragma_frag = "React.Fragment"
//! minify = false
//!
//! [script.loop_guard]
//! enable = true
//! mode = "iterations"
//! limit = 100
//! ```

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Iteration budget used when nothing is configured.
pub const DEFAULT_LOOP_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Environment-lowering target (`es2015`, `es2020`, `chrome80`, ...).
    pub target: String,
    /// JSX lowering runtime.
    pub jsx_runtime: JsxRuntimeKind,
    /// Factory used by the classic runtime.
    pub jsx_pragma: String,
    /// Fragment factory used by the classic runtime.
    pub jsx_pragma_frag: String,
    /// Minify the guarded output.
    pub minify: bool,
    /// Loop guard injected into compiled code.
    pub loop_guard: LoopGuardConfig,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            target: "es2015".into(),
            jsx_runtime: JsxRuntimeKind::Classic,
            jsx_pragma: "React.createElement".into(),
            jsx_pragma_frag: "React.Fragment".into(),
            minify: false,
            loop_guard: LoopGuardConfig::default(),
        }
    }
}

impl ScriptConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.trim().is_empty() {
            return Err(ConfigError::Validation("script.target must not be empty".into()));
        }
        if self.jsx_runtime == JsxRuntimeKind::Classic && self.jsx_pragma.trim().is_empty() {
            return Err(ConfigError::Validation(
                "script.jsx_pragma must not be empty with the classic runtime".into(),
            ));
        }
        self.loop_guard.validate()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsxRuntimeKind {
    /// `React.createElement` calls, no imports.
    #[default]
    Classic,
    /// `react/jsx-runtime` imports.
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopGuardConfig {
    pub enable: bool,
    pub mode: GuardMode,
    /// Iterations or milliseconds, depending on `mode`.
    pub limit: u32,
}

impl Default for LoopGuardConfig {
    fn default() -> Self {
        Self {
            enable: true,
            mode: GuardMode::Iterations,
            limit: DEFAULT_LOOP_LIMIT,
        }
    }
}

impl LoopGuardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enable && self.limit == 0 {
            return Err(ConfigError::Validation(
                "script.loop_guard.limit must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// How the loop guard measures a loop's budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Break after `limit` iterations of one loop run.
    #[default]
    Iterations,
    /// Break once one loop run has taken more than `limit` milliseconds.
    Millis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScriptConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_limit_rejected_only_when_enabled() {
        let mut guard = LoopGuardConfig {
            limit: 0,
            ..LoopGuardConfig::default()
        };
        assert!(guard.validate().is_err());

        guard.enable = false;
        assert!(guard.validate().is_ok());
    }

    #[test]
    fn test_empty_target_rejected() {
        let config = ScriptConfig {
            target: "  ".into(),
            ..ScriptConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_pragma_allowed_with_automatic_runtime() {
        let config = ScriptConfig {
            jsx_runtime: JsxRuntimeKind::Automatic,
            jsx_pragma: String::new(),
            ..ScriptConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
