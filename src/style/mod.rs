//! Style compilers for embedded stylesheet blocks.
//!
//! A [`StyleCompiler`] follows a completion-callback contract: `compile`
//! receives the block source and a one-shot callback, and must invoke the
//! callback exactly once with the result, now or later, on any thread.
//! The style stage bridges every callback to a channel and awaits them all.
//!
//! Whether a compiler is available is decided by the pipeline's caller: no
//! compiler means `text/sass` blocks are left as they are.

mod grass;

pub use self::grass::GrassCompiler;

/// Compiled CSS, or the compiler's error message.
pub type StyleResult = Result<String, String>;

/// Completion callback handed to [`StyleCompiler::compile`].
pub type OnComplete = Box<dyn FnOnce(StyleResult) + Send + 'static>;

/// Callback-style stylesheet compiler.
pub trait StyleCompiler: Send + Sync {
    /// Start compiling `source`. `on_complete` must be invoked exactly once.
    fn compile(&self, source: String, on_complete: OnComplete);
}

/// `type` attribute values marking a block for compilation.
const SASS_TYPES: [&str; 2] = ["text/sass", "text/scss"];

/// `type` attribute value of a compiled block.
pub const CSS_TYPE: &str = "text/css";

/// Check whether a `type` attribute value marks an uncompiled Sass block.
#[inline]
pub fn is_sass_type(value: &str) -> bool {
    let value = value.trim();
    SASS_TYPES.iter().any(|ty| value.eq_ignore_ascii_case(ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sass_type() {
        assert!(is_sass_type("text/sass"));
        assert!(is_sass_type(" Text/SASS "));
        assert!(is_sass_type("text/scss"));
        assert!(!is_sass_type("text/css"));
        assert!(!is_sass_type(""));
        assert!(!is_sass_type("sass"));
    }
}
