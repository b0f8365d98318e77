//! Pipeline error types.

use std::fmt;
use thiserror::Error;

// ============================================================================
// CompileError
// ============================================================================

/// Script compilation failure: parse, semantic or transform diagnostics.
#[derive(Debug, Clone, Error)]
pub struct CompileError {
    /// Path of the file being compiled (`name.ext`).
    pub file: String,
    /// Rendered diagnostics, one per entry.
    pub diagnostics: Vec<String>,
}

impl CompileError {
    pub fn new(file: impl Into<String>, diagnostics: Vec<String>) -> Self {
        Self {
            file: file.into(),
            diagnostics,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to compile `{}`", self.file)?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n  {diagnostic}")?;
        }
        Ok(())
    }
}

// ============================================================================
// StyleError
// ============================================================================

#[derive(Debug, Clone, Error)]
pub enum StyleError {
    /// The style compiler dropped its completion callback without calling it.
    #[error("style compiler dropped a block without completing it")]
    Abandoned,

    #[error("style compiler worker failed: {0}")]
    Worker(String),
}

// ============================================================================
// TransformError
// ============================================================================

/// Error that halts processing of one file.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    #[error(transparent)]
    Script(#[from] CompileError),

    #[error(transparent)]
    Style(#[from] StyleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::new(
            "index.js",
            vec!["Unexpected token".into(), "Expected `}`".into()],
        );
        let display = err.to_string();
        assert!(display.starts_with("failed to compile `index.js`"));
        assert!(display.contains("\n  Unexpected token"));
        assert!(display.contains("\n  Expected `}`"));
    }

    #[test]
    fn test_transform_error_is_transparent() {
        let err = TransformError::from(CompileError::new("a.jsx", vec![]));
        assert_eq!(err.to_string(), "failed to compile `a.jsx`");

        let err = TransformError::from(StyleError::Abandoned);
        assert!(err.to_string().contains("dropped"));
    }
}
