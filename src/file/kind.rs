//! Extension predicates.

use super::VirtualFile;

/// File classification used for stage dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Js,
    Jsx,
    Html,
    /// Anything else. Every stage passes these through.
    Other,
}

impl FileKind {
    /// Classify by exact extension match.
    pub fn of(file: &VirtualFile) -> Self {
        match file.extension.as_str() {
            "js" => Self::Js,
            "jsx" => Self::Jsx,
            "html" => Self::Html,
            _ => Self::Other,
        }
    }
}

#[inline]
pub fn is_js(file: &VirtualFile) -> bool {
    FileKind::of(file) == FileKind::Js
}

#[inline]
pub fn is_html(file: &VirtualFile) -> bool {
    FileKind::of(file) == FileKind::Html
}

#[inline]
pub fn is_html_or_js(file: &VirtualFile) -> bool {
    is_html(file) || is_js(file)
}

#[inline]
pub fn is_js_or_jsx(file: &VirtualFile) -> bool {
    is_js(file) || FileKind::of(file) == FileKind::Jsx
}
