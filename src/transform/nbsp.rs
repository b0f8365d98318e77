//! Non-breaking space cleanup.
//!
//! Editors and copy-paste from rendered pages leave U+00A0 in user code,
//! which the JS parser rejects outside string literals.

use crate::file::{VirtualFile, is_html_or_js};

const NBSP: char = '\u{00A0}';

/// Replace every non-breaking space in HTML/JS contents with a plain space.
///
/// Other files, including JSX, are returned unchanged.
pub fn replace_nbsp(file: VirtualFile) -> VirtualFile {
    if !is_html_or_js(&file) || !file.contents.contains(NBSP) {
        return file;
    }
    file.transform_contents(|contents| contents.replace(NBSP, " "))
}
