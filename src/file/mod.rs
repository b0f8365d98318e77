//! Virtual source files.
//!
//! A [`VirtualFile`] is one challenge file as handed over by the editor:
//! an extension used for dispatch, optional wrapper text around the
//! editable body, and the body itself.
//!
//! Records are never mutated in place. Every update consumes the record
//! and returns a new one, so a caller holding the original keeps it intact
//! by cloning before handing it to the pipeline.

mod kind;

pub use kind::{FileKind, is_html, is_html_or_js, is_js, is_js_or_jsx};

use std::path::Path;

/// One source file flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// Base name without extension (`index` for `index.html`).
    pub name: String,
    /// Extension tag used for dispatch (`js`, `jsx`, `html`, ...).
    pub extension: String,
    /// Wrapper text placed before `contents`, hidden from the editor.
    pub head: String,
    /// Wrapper text placed after `contents`, hidden from the editor.
    pub tail: String,
    /// Editable body.
    pub contents: String,
    /// Every path this file has had, oldest first.
    pub history: Vec<String>,
}

impl VirtualFile {
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let extension = extension.into();
        let history = vec![join_path(&name, &extension)];
        Self {
            name,
            extension,
            head: String::new(),
            tail: String::new(),
            contents: contents.into(),
            history,
        }
    }

    /// Build a record from a file path, splitting stem and extension.
    ///
    /// A path without extension yields an empty extension, which no stage
    /// dispatches on.
    pub fn from_path(path: &Path, contents: impl Into<String>) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name, extension, contents)
    }

    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = head.into();
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Current path, `name.ext`.
    pub fn path(&self) -> String {
        join_path(&self.name, &self.extension)
    }

    /// Classify the record by its extension.
    #[inline]
    pub fn kind(&self) -> FileKind {
        FileKind::of(self)
    }

    /// Replace the extension and record the new path in `history`.
    pub fn set_ext(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        let path = self.path();
        if self.history.last() != Some(&path) {
            self.history.push(path);
        }
        self
    }

    pub fn set_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = contents.into();
        self
    }

    /// Replace `contents` with `f(contents)`.
    pub fn transform_contents(self, f: impl FnOnce(&str) -> String) -> Self {
        let contents = f(&self.contents);
        self.set_contents(contents)
    }

    /// Fold `head` and `tail` into `contents`, leaving both wrappers empty.
    pub fn compile_head_tail(mut self) -> Self {
        if self.head.is_empty() && self.tail.is_empty() {
            return self;
        }
        let mut unit =
            String::with_capacity(self.head.len() + self.contents.len() + self.tail.len());
        unit.push_str(&self.head);
        unit.push_str(&self.contents);
        unit.push_str(&self.tail);
        self.head.clear();
        self.tail.clear();
        self.contents = unit;
        self
    }
}

fn join_path(name: &str, extension: &str) -> String {
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    }
}
