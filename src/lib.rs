//! rechallenge - preview pipeline for coding challenge files.
//!
//! Files are carried through the pipeline as [`VirtualFile`] records:
//!
//! - HTML and JS: non-breaking spaces replaced with plain spaces
//! - JS and JSX: transpiled with oxc, every loop guarded against running forever
//! - HTML: embedded Sass blocks compiled to CSS
//!
//! Everything else passes through untouched.

pub mod logger;

pub mod cli;
pub mod config;
pub mod error;
pub mod file;
pub mod minify;
pub mod pipeline;
pub mod style;
pub mod transform;

pub use config::Config;
pub use error::{CompileError, StyleError, TransformError};
pub use file::{FileKind, VirtualFile};
pub use pipeline::{Pipeline, Stage};
pub use style::{GrassCompiler, StyleCompiler};
