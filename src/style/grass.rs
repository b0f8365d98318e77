//! Built-in Sass compiler backed by `grass`.

use ::grass::{InputSyntax, Options, OutputStyle};

use super::{OnComplete, StyleCompiler, StyleResult};
use crate::config::{StyleConfig, StyleOutputStyle};
use crate::minify::minify_css;

/// SCSS compiler running on tokio's blocking pool when a runtime is present,
/// inline otherwise.
#[derive(Debug, Clone)]
pub struct GrassCompiler {
    output: StyleOutputStyle,
    minify: bool,
}

impl GrassCompiler {
    pub fn new(config: &StyleConfig) -> Self {
        Self {
            output: config.output,
            minify: config.minify,
        }
    }

    /// Compile one block synchronously.
    pub fn compile_now(&self, source: &str) -> StyleResult {
        let style = match self.output {
            StyleOutputStyle::Expanded => OutputStyle::Expanded,
            StyleOutputStyle::Compressed => OutputStyle::Compressed,
        };
        let options = Options::default()
            .style(style)
            .input_syntax(InputSyntax::Scss);
        let css = ::grass::from_string(source.to_owned(), &options).map_err(|err| err.to_string())?;

        if !self.minify {
            return Ok(css);
        }
        match minify_css(&css) {
            Ok(minified) => Ok(minified),
            Err(err) => {
                crate::debug!("style"; "minify failed, keeping compiled css: {}", err);
                Ok(css)
            }
        }
    }
}

impl Default for GrassCompiler {
    fn default() -> Self {
        Self::new(&StyleConfig::default())
    }
}

impl StyleCompiler for GrassCompiler {
    fn compile(&self, source: String, on_complete: OnComplete) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let compiler = self.clone();
                // A panicking worker drops `on_complete`, which the style
                // stage reports as an abandoned block.
                handle.spawn_blocking(move || on_complete(compiler.compile_now(&source)));
            }
            Err(_) => on_complete(self.compile_now(&source)),
        }
    }
}
