//! `[style]` section: embedded Sass compilation.
//!
//! # Example
//!
//! ```toml
//! [style]
//! enable = true
//! output = "compressed"
//! minify = false
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Use the built-in Sass compiler. When disabled the compiler is treated
    /// as unavailable and `text/sass` blocks are left untouched.
    pub enable: bool,
    /// CSS output style.
    pub output: StyleOutputStyle,
    /// Run compiled CSS through lightningcss minification.
    pub minify: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            enable: true,
            output: StyleOutputStyle::Expanded,
            minify: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleOutputStyle {
    #[default]
    Expanded,
    Compressed,
}
