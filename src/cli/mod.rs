//! Command-line interface module.

mod args;
pub mod transform;

pub use args::{Cli, Commands, InputArgs};
