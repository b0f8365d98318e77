//! Pipeline stages.
//!
//! Each stage checks the file kind itself and returns the file unchanged
//! when it does not apply, so stages can also be used on their own.
//!
//! - `nbsp`: non-breaking space cleanup (HTML, JS)
//! - `script`: transpilation with loop guards and inlined runtime helpers (JS, JSX)
//! - `style`: embedded Sass compilation (HTML)
//! - `safe`: logging failure boundary around fallible stages

mod helpers;
mod loop_guard;
mod nbsp;
mod safe;
mod script;
mod style;

pub use loop_guard::LoopGuard;
pub use nbsp::replace_nbsp;
pub use safe::{report, try_transform};
pub use script::ScriptTransformer;
pub use style::compile_styles;
