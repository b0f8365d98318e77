//! Stage assembly.
//!
//! ```text
//! VirtualFile -> Normalize -> Script -> Style -> VirtualFile
//! ```
//!
//! The order is fixed: scripts are transpiled from normalized text, and the
//! style stage (HTML only) conventionally runs last. Every run is async
//! because the style stage waits on its compiler; the other stages resolve
//! without suspending.

use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::error::TransformError;
use crate::file::{FileKind, VirtualFile};
use crate::style::{GrassCompiler, StyleCompiler};
use crate::transform::{ScriptTransformer, compile_styles, replace_nbsp, report, try_transform};

/// One self-dispatching pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Script,
    Style,
}

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Script => "script",
            Self::Style => "style",
        }
    }
}

/// Transform pipeline for challenge files.
pub struct Pipeline {
    script: ScriptTransformer,
    style: Option<Arc<dyn StyleCompiler>>,
}

impl Pipeline {
    /// Build the pipeline from config. The built-in Sass compiler is used
    /// when `style.enable` is set.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let style = config
            .style
            .enable
            .then(|| Arc::new(GrassCompiler::new(&config.style)) as Arc<dyn StyleCompiler>);
        Ok(Self {
            script: ScriptTransformer::new(&config.script)?,
            style,
        })
    }

    /// Use a custom style compiler.
    pub fn with_style_compiler(mut self, compiler: Arc<dyn StyleCompiler>) -> Self {
        self.style = Some(compiler);
        self
    }

    /// Treat the style compiler as unavailable.
    pub fn without_style_compiler(mut self) -> Self {
        self.style = None;
        self
    }

    pub fn has_style_compiler(&self) -> bool {
        self.style.is_some()
    }

    /// Stages in execution order.
    pub const fn stages() -> [Stage; 3] {
        [Stage::Normalize, Stage::Script, Stage::Style]
    }

    /// Run one file through every stage.
    ///
    /// The first failing stage ends the run; its error has already been
    /// written to the diagnostic channel.
    pub async fn run(&self, file: VirtualFile) -> Result<VirtualFile, TransformError> {
        let mut file = file;
        for stage in Self::stages() {
            crate::debug!("pipeline"; "{} {}", stage.name(), file.path());
            file = self.apply(stage, file).await?;
        }
        Ok(file)
    }

    /// Run several files, one after another. A failure only affects its own
    /// entry. Results keep input order.
    pub async fn run_all(
        &self,
        files: Vec<VirtualFile>,
    ) -> Vec<Result<VirtualFile, TransformError>> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.run(file).await);
        }
        results
    }

    async fn apply(&self, stage: Stage, file: VirtualFile) -> Result<VirtualFile, TransformError> {
        match (stage, file.kind()) {
            (Stage::Normalize, FileKind::Html | FileKind::Js) => Ok(replace_nbsp(file)),
            (Stage::Script, FileKind::Js | FileKind::Jsx) => {
                Ok(try_transform(file, |file| self.script.transform(file))?)
            }
            (Stage::Style, FileKind::Html) => Ok(compile_styles(file, self.style.as_deref())
                .await
                .inspect_err(report)?),
            _ => Ok(file),
        }
    }
}
