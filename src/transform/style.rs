//! Embedded Sass compilation for HTML files.
//!
//! `<style type="text/sass">` blocks are located with `tl`, compiled through
//! the configured [`StyleCompiler`], and spliced back into the original
//! markup as `<style type="text/css">`. Everything outside the rewritten
//! blocks is kept byte for byte.

use std::borrow::Cow;

use tokio::sync::oneshot;

use crate::error::StyleError;
use crate::file::{VirtualFile, is_html};
use crate::style::{CSS_TYPE, StyleCompiler, is_sass_type};

/// One `<style>` element awaiting compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SassBlock {
    /// Byte range of the whole element in the source.
    start: usize,
    end: usize,
    /// Attributes in source order, values as written.
    attrs: Vec<(String, Option<String>)>,
    /// Inner text of the element.
    source: String,
}

/// Compile every Sass block of an HTML file.
///
/// Returns immediately when the file is not HTML, has no Sass blocks, or no
/// compiler is available. Otherwise all blocks are handed to the compiler
/// first and the result resolves once every one of them has completed.
///
/// A block whose compilation reports an error is left as it was. A compiler
/// that never invokes its callback keeps this future pending.
pub async fn compile_styles(
    file: VirtualFile,
    compiler: Option<&dyn StyleCompiler>,
) -> Result<VirtualFile, StyleError> {
    if !is_html(&file) {
        return Ok(file);
    }
    let Some(compiler) = compiler else {
        crate::debug!("style"; "no style compiler, {} passed through", file.path());
        return Ok(file);
    };
    let blocks = collect_sass_blocks(&file.contents);
    if blocks.is_empty() {
        return Ok(file);
    }

    let pending: Vec<_> = blocks
        .iter()
        .map(|block| {
            let (tx, rx) = oneshot::channel();
            compiler.compile(
                block.source.clone(),
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            );
            rx
        })
        .collect();

    let mut compiled = Vec::with_capacity(blocks.len());
    for (block, rx) in blocks.into_iter().zip(pending) {
        match rx.await.map_err(|_| StyleError::Abandoned)? {
            Ok(css) => compiled.push((block, css)),
            Err(message) => {
                crate::log!("warn"; "{}: sass block left uncompiled: {}", file.path(), message);
            }
        }
    }

    crate::debug!("style"; "compiled {} block(s) in {}", compiled.len(), file.path());
    let contents = splice_blocks(&file.contents, &compiled);
    Ok(file.set_contents(contents))
}

/// Locate Sass `<style>` elements in document order.
///
/// `tl` supplies the start tags and their attributes. Element contents are
/// raw text ending at the first matching end tag, so the inner text and the
/// element end are read from the source rather than from parsed children.
/// Anything that looks like a tag inside the raw text of an earlier
/// `<script>` or `<style>` is text and is skipped.
fn collect_sass_blocks(html: &str) -> Vec<SassBlock> {
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return Vec::new();
    };

    let mut tags: Vec<(usize, &tl::HTMLTag<'_>)> = dom
        .nodes()
        .iter()
        .filter_map(|node| node.as_tag())
        .filter(|tag| {
            let name = tag.name().as_utf8_str();
            name.eq_ignore_ascii_case("style") || name.eq_ignore_ascii_case("script")
        })
        .filter_map(|tag| Some((offset_in(html, tag.raw().as_bytes())?, tag)))
        .collect();
    tags.sort_by_key(|(start, _)| *start);

    let mut blocks = Vec::new();
    let mut covered_until = 0;
    for (start, tag) in tags {
        if start < covered_until {
            continue;
        }
        let name = tag.name().as_utf8_str();
        let Some(element) = raw_text_element(html, start, &name) else {
            continue;
        };
        covered_until = element.end;

        if !name.eq_ignore_ascii_case("style") {
            continue;
        }
        let attrs: Vec<(String, Option<String>)> = tag
            .attributes()
            .iter()
            .map(|(key, value)| (key.into_owned(), value.map(Cow::into_owned)))
            .collect();
        let is_sass = attrs.iter().any(|(key, value)| {
            key.eq_ignore_ascii_case("type") && value.as_deref().is_some_and(is_sass_type)
        });
        if is_sass {
            blocks.push(SassBlock {
                start,
                end: element.end,
                attrs,
                source: html[element.content_start..element.content_end].to_string(),
            });
        }
    }
    blocks
}

/// Byte layout of a raw text element (`<style>`, `<script>`) in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawTextElement {
    content_start: usize,
    content_end: usize,
    end: usize,
}

/// Measure the raw text element whose start tag begins at `start`.
///
/// Contents end at the first `</name` (ASCII case-insensitive). An element
/// without an end tag runs to the end of the source.
fn raw_text_element(html: &str, start: usize, name: &str) -> Option<RawTextElement> {
    let content_start = start_tag_end(html, start)?;
    let closing = format!("</{}", name.to_ascii_lowercase());
    let content_end = html[content_start..]
        .to_ascii_lowercase()
        .find(&closing)
        .map_or(html.len(), |pos| content_start + pos);
    let end = html[content_end..]
        .find('>')
        .map_or(html.len(), |pos| content_end + pos + 1);
    Some(RawTextElement {
        content_start,
        content_end,
        end,
    })
}

/// Offset just past the `>` closing the start tag at `start`, skipping
/// quoted attribute values.
fn start_tag_end(html: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (pos, byte) in html.as_bytes()[start..].iter().enumerate() {
        match (quote, byte) {
            (Some(open), _) if *byte == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(*byte),
            (None, b'>') => return Some(start + pos + 1),
            _ => {}
        }
    }
    None
}

/// Byte offset of `slice` inside `source`, if it borrows from it.
fn offset_in(source: &str, slice: &[u8]) -> Option<usize> {
    let start = (slice.as_ptr() as usize).checked_sub(source.as_ptr() as usize)?;
    (start + slice.len() <= source.len()).then_some(start)
}

/// Replace each compiled block with its `text/css` rendering.
fn splice_blocks(html: &str, compiled: &[(SassBlock, String)]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for (block, css) in compiled {
        out.push_str(&html[cursor..block.start]);
        render_block(&mut out, &block.attrs, css);
        cursor = block.end;
    }
    out.push_str(&html[cursor..]);
    out
}

fn render_block(out: &mut String, attrs: &[(String, Option<String>)], css: &str) {
    out.push_str("<style");
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        let value = if key.eq_ignore_ascii_case("type") {
            Some(CSS_TYPE)
        } else {
            value.as_deref()
        };
        if let Some(value) = value {
            let quote = if value.contains('"') { '\'' } else { '"' };
            out.push('=');
            out.push(quote);
            out.push_str(value);
            out.push(quote);
        }
    }
    out.push('>');
    out.push_str(css);
    out.push_str("</style>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{OnComplete, StyleResult};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    /// Completes immediately with the uppercased source.
    struct Uppercase;

    impl StyleCompiler for Uppercase {
        fn compile(&self, source: String, on_complete: OnComplete) {
            on_complete(Ok(source.to_uppercase()));
        }
    }

    /// Holds callbacks until the test releases them.
    #[derive(Default)]
    struct Gated {
        pending: Mutex<Vec<(String, OnComplete)>>,
    }

    impl StyleCompiler for Gated {
        fn compile(&self, source: String, on_complete: OnComplete) {
            self.pending.lock().push((source, on_complete));
        }
    }

    impl Gated {
        fn release_last(&self, result: impl FnOnce(&str) -> StyleResult) {
            let (source, on_complete) = self.pending.lock().pop().unwrap();
            on_complete(result(&source));
        }
    }

    /// Drops callbacks without invoking them.
    struct Dropping;

    impl StyleCompiler for Dropping {
        fn compile(&self, _source: String, _on_complete: OnComplete) {}
    }

    /// Reports a compile error for every block.
    struct Failing;

    impl StyleCompiler for Failing {
        fn compile(&self, _source: String, on_complete: OnComplete) {
            on_complete(Err("Expected expression.".into()));
        }
    }

    fn html(contents: &str) -> VirtualFile {
        VirtualFile::new("index", "html", contents)
    }

    #[tokio::test]
    async fn test_uppercase_example() {
        let file = html(r#"<style type="text/sass">body{color:red}</style>"#);
        let out = compile_styles(file, Some(&Uppercase)).await.unwrap();
        assert_eq!(out.extension, "html");
        assert_eq!(out.contents, r#"<style type="text/css">BODY{COLOR:RED}</style>"#);
    }

    #[tokio::test]
    async fn test_no_sass_blocks_preserves_markup() {
        let source = "<div id=\"a\" class='b'><style>p{}</style><style type=\"text/css\">a{}</style></div>";
        let out = compile_styles(html(source), Some(&Uppercase)).await.unwrap();
        assert_eq!(out.contents, source);
    }

    #[tokio::test]
    async fn test_unavailable_compiler_passes_through() {
        let source = r#"<style type="text/sass">body{color:red}</style>"#;
        let out = compile_styles(html(source), None).await.unwrap();
        assert_eq!(out.contents, source);
    }

    #[tokio::test]
    async fn test_non_html_untouched() {
        let file = VirtualFile::new("index", "js", r#"<style type="text/sass">x</style>"#);
        let out = compile_styles(file.clone(), Some(&Uppercase)).await.unwrap();
        assert_eq!(out, file);
    }

    #[tokio::test]
    async fn test_multiple_blocks_and_surrounding_markup() {
        let source = concat!(
            "<h1>Title</h1>\n",
            "<style type=\"text/sass\">a{b:c}</style>\n",
            "<p>text</p>\n",
            "<style type='TEXT/SASS'>d{e:f}</style>\n",
            "<style>keep{}</style>",
        );
        let out = compile_styles(html(source), Some(&Uppercase)).await.unwrap();
        assert_eq!(
            out.contents,
            concat!(
                "<h1>Title</h1>\n",
                "<style type=\"text/css\">A{B:C}</style>\n",
                "<p>text</p>\n",
                "<style type=\"text/css\">D{E:F}</style>\n",
                "<style>keep{}</style>",
            )
        );
    }

    #[tokio::test]
    async fn test_other_attributes_kept() {
        let source = "<style media=\"screen\" type=\"text/sass\">a{}</style>";
        let out = compile_styles(html(source), Some(&Uppercase)).await.unwrap();
        assert!(out.contents.starts_with("<style "));
        assert!(out.contents.contains("media=\"screen\""));
        assert!(out.contents.contains("type=\"text/css\""));
        assert!(out.contents.ends_with(">A{}</style>"));
    }

    #[tokio::test]
    async fn test_resolves_only_after_all_blocks() {
        let compiler = Arc::new(Gated::default());
        let file = html(concat!(
            "<style type=\"text/sass\">one</style>",
            "<style type=\"text/sass\">two</style>",
        ));

        let task = tokio::spawn({
            let compiler = Arc::clone(&compiler);
            async move { compile_styles(file, Some(compiler.as_ref())).await }
        });

        while compiler.pending.lock().len() < 2 {
            tokio::task::yield_now().await;
        }

        // Complete out of order: second block first
        compiler.release_last(|source| Ok(format!("/*{source}*/")));
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        compiler.release_last(|source| Ok(format!("/*{source}*/")));
        let out = task.await.unwrap().unwrap();
        assert_eq!(
            out.contents,
            "<style type=\"text/css\">/*one*/</style><style type=\"text/css\">/*two*/</style>"
        );
    }

    #[tokio::test]
    async fn test_never_completing_compiler_stalls() {
        let compiler = Gated::default();
        let file = html("<style type=\"text/sass\">a{}</style>");
        let result =
            tokio::time::timeout(Duration::from_millis(50), compile_styles(file, Some(&compiler)))
                .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dropped_callback_is_abandoned() {
        let file = html("<style type=\"text/sass\">a{}</style>");
        let err = compile_styles(file, Some(&Dropping)).await.unwrap_err();
        assert!(matches!(err, StyleError::Abandoned));
    }

    #[tokio::test]
    async fn test_failed_block_left_unchanged() {
        let source = "<style type=\"text/sass\">a{</style>";
        let out = compile_styles(html(source), Some(&Failing)).await.unwrap();
        assert_eq!(out.contents, source);
    }

    #[tokio::test]
    async fn test_markup_like_text_inside_block() {
        let source = concat!(
            "<style type=\"text/sass\">a::before { content: \"<b>\" } ul > li { x: y }</style>",
            "<p>after</p>",
        );
        let out = compile_styles(html(source), Some(&Uppercase)).await.unwrap();
        assert_eq!(
            out.contents,
            concat!(
                "<style type=\"text/css\">A::BEFORE { CONTENT: \"<B>\" } UL > LI { X: Y }</style>",
                "<p>after</p>",
            )
        );
    }

    #[tokio::test]
    async fn test_style_markup_inside_script_is_text() {
        let script = "<script>var s = \"<style type='text/sass'>x{}</style>\";</script>";
        let source = format!("{script}<style type=\"text/sass\">a{{}}</style>");
        let out = compile_styles(html(&source), Some(&Uppercase)).await.unwrap();
        assert_eq!(
            out.contents,
            format!("{script}<style type=\"text/css\">A{{}}</style>")
        );
    }

    #[test]
    fn test_uppercase_end_tag() {
        let blocks = collect_sass_blocks("<style type=\"text/scss\">a{}</STYLE>tail");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source, "a{}");
        assert_eq!(blocks[0].end, "<style type=\"text/scss\">a{}</STYLE>".len());
    }

    #[test]
    fn test_start_tag_end_skips_quoted_gt() {
        assert_eq!(start_tag_end("<style title=\"a>b\">x", 0), Some(19));
        assert_eq!(start_tag_end("<style title='a>b'", 0), None);
    }

    #[test]
    fn test_unterminated_raw_text_runs_to_end() {
        let html = "<style>abc";
        let element = raw_text_element(html, 0, "style").unwrap();
        assert_eq!(element.content_start, 7);
        assert_eq!(element.content_end, html.len());
        assert_eq!(element.end, html.len());
    }

    #[test]
    fn test_collect_reads_inner_text_and_attrs() {
        let blocks = collect_sass_blocks("<p>x</p><style data-x type=\"text/sass\">$a: 1;</style>");
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.start, 8);
        assert_eq!(block.source, "$a: 1;");
        assert!(block.attrs.iter().any(|(k, _)| k == "data-x"));
    }

    #[test]
    fn test_render_block_quotes() {
        let mut out = String::new();
        render_block(
            &mut out,
            &[
                ("type".into(), Some("text/sass".into())),
                ("title".into(), Some("say \"hi\"".into())),
                ("nonce".into(), None),
            ],
            "a{}",
        );
        assert_eq!(out, "<style type=\"text/css\" title='say \"hi\"' nonce>a{}</style>");
    }
}
