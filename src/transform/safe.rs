//! Failure boundary for user-code transforms.
//!
//! A transform that fails on user code (syntax errors, unsupported
//! constructs) must stop that file's build instead of handing a half
//! transformed file to the preview. The error is written to the diagnostic
//! channel here and then returned for the pipeline to propagate with `?`.

use std::fmt::Display;

/// Run `transform` on `input`, logging any error before returning it.
pub fn try_transform<T, E: Display>(
    input: T,
    transform: impl FnOnce(T) -> Result<T, E>,
) -> Result<T, E> {
    transform(input).inspect_err(report)
}

/// Write a pipeline-halting error to the diagnostic channel.
pub fn report<E: Display>(err: &E) {
    crate::log!("error"; "{}", err);
}
