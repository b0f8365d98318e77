//! JS/JSX transpilation.
//!
//! ```text
//! head + contents + tail
//!   -> parse (jsx enabled)
//!   -> semantic checks
//!   -> transform (env lowering, jsx lowering)
//!   -> codegen
//!   -> loop guard
//!   -> helper prologue
//!   -> minify (optional)
//! ```
//!
//! Compiler options are built once per transformer from [`ScriptConfig`].

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::diagnostics::OxcDiagnostic;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{HelperLoaderMode, JsxRuntime, TransformOptions, Transformer};

use super::helpers::{HELPERS_GLOBAL, prologue, referenced_helpers};
use super::loop_guard::LoopGuard;
use crate::config::{ConfigError, JsxRuntimeKind, ScriptConfig};
use crate::error::CompileError;
use crate::file::{VirtualFile, is_js_or_jsx};
use crate::minify::minify_js;

/// Compiles JS/JSX files to plain JS with loops guarded.
#[derive(Debug)]
pub struct ScriptTransformer {
    options: TransformOptions,
    guard: Option<LoopGuard>,
    minify: bool,
}

impl ScriptTransformer {
    /// Build the transformer, rejecting targets the lowering preset does not
    /// understand.
    pub fn new(config: &ScriptConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            options: transform_options(config)?,
            guard: LoopGuard::from_config(&config.loop_guard),
            minify: config.minify,
        })
    }

    /// Compile a JS/JSX file. Other files are returned unchanged.
    ///
    /// Head and tail are compiled together with the contents as one unit and
    /// folded into the new contents. The extension becomes `js`.
    pub fn transform(&self, file: VirtualFile) -> Result<VirtualFile, CompileError> {
        if !is_js_or_jsx(&file) {
            return Ok(file);
        }
        let file = file.compile_head_tail();
        let code = self.compile(&file.path(), &file.contents)?;
        crate::debug!("script"; "compiled {} ({} bytes)", file.path(), code.len());
        Ok(file.set_contents(code).set_ext("js"))
    }

    /// Compile one unit of source text.
    pub fn compile(&self, path: &str, source: &str) -> Result<String, CompileError> {
        let fail = |diagnostics: Vec<String>| CompileError::new(path, diagnostics);

        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::jsx()).parse();
        if !ret.errors.is_empty() {
            return Err(fail(render(&ret.errors)));
        }
        let mut program = ret.program;

        let ret = SemanticBuilder::new()
            .with_check_syntax_error(true)
            .build(&program);
        if !ret.errors.is_empty() {
            return Err(fail(render(&ret.errors)));
        }
        let scoping = ret.semantic.into_scoping();

        let ret = Transformer::new(&allocator, Path::new(path), &self.options)
            .build_with_scoping(scoping, &mut program);
        if !ret.errors.is_empty() {
            return Err(fail(render(&ret.errors)));
        }

        let helpers = prologue(&referenced_helpers(&program)).map_err(|missing| {
            fail(missing
                .iter()
                .map(|name| format!("unsupported runtime helper `{HELPERS_GLOBAL}.{name}`"))
                .collect())
        })?;

        let mut code = Codegen::new().build(&program).code;

        if let Some(guard) = &self.guard {
            code = guard.apply(&code, SourceType::mjs()).map_err(fail)?;
        }

        // Helper bodies stay unguarded
        if !helpers.is_empty() {
            code.insert_str(0, &helpers);
        }

        if self.minify {
            match minify_js(&code) {
                Ok(minified) => code = minified,
                Err(errors) => {
                    crate::debug!("script"; "minify skipped for {}: {}", path, errors.join("; "));
                }
            }
        }

        Ok(code)
    }
}

/// Lowering preset for `target` plus JSX lowering.
fn transform_options(config: &ScriptConfig) -> Result<TransformOptions, ConfigError> {
    let mut options = TransformOptions::from_target(&config.target).map_err(|err| {
        ConfigError::Validation(format!("script.target `{}`: {}", config.target, err))
    })?;

    options.jsx.jsx_plugin = true;
    match config.jsx_runtime {
        JsxRuntimeKind::Classic => {
            options.jsx.runtime = JsxRuntime::Classic;
            options.jsx.pragma = Some(config.jsx_pragma.clone());
            options.jsx.pragma_frag = Some(config.jsx_pragma_frag.clone());
        }
        JsxRuntimeKind::Automatic => options.jsx.runtime = JsxRuntime::Automatic,
    }
    // Helpers resolve to a `babelHelpers` global defined by the prologue
    options.helper_loader.mode = HelperLoaderMode::External;

    Ok(options)
}

fn render(errors: &[OxcDiagnostic]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}
