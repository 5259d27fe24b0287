//! Block delimiter grammar.
//!
//! Blocks are delimited by HTML comments in one of two shapes:
//!
//! - Self-closing: `<!-- wp:name {"attr":1} /-->`
//! - Paired: `<!-- wp:name {"attr":1} -->` body `<!-- /wp:name -->`
//!
//! The attribute object is optional in both shapes. The grammar is purely
//! lexical: attribute JSON and body markup are captured, never validated.

use std::ops::Range;

use gm_config::is_valid_namespace;
use regex::Regex;

use crate::error::{BlockError, GrammarError};

/// Namespace used by the block editor.
pub const DEFAULT_NAMESPACE: &str = "wp";

/// Block name: optional `vendor/` prefix plus a lowercase slug.
const NAME_PATTERN: &str = r"[a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?";

/// Expected shape of a block span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// Header only, ends with `/-->`.
    SelfClosing,
    /// Header, body and closing marker.
    Paired,
}

/// One top-level block occurrence found by [`BlockGrammar::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlockSpan {
    /// Byte offset of the opening `<!--`.
    pub start: usize,
    /// Byte offset just past the final `-->`.
    pub end: usize,
    /// Block name from the header.
    pub name: String,
    /// Whether the block is a single self-closing comment.
    pub self_closing: bool,
}

impl RawBlockSpan {
    /// Source text of the span.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Shape to request when splitting this span.
    #[must_use]
    pub fn shape(&self) -> BlockShape {
        if self.self_closing {
            BlockShape::SelfClosing
        } else {
            BlockShape::Paired
        }
    }
}

/// Captures of a block span that matched its expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockParts<'a> {
    source: &'a str,
    /// Block name (never empty).
    pub name: &'a str,
    /// Raw JSON attribute object, if the header has one.
    pub attributes: Option<&'a str>,
    body: Option<Range<usize>>,
}

impl<'a> BlockParts<'a> {
    /// Inner markup of a paired block.
    #[must_use]
    pub fn body(&self) -> Option<&'a str> {
        self.body.clone().map(|range| &self.source[range])
    }

    /// Everything before the body: the opening comment and its newline.
    #[must_use]
    pub fn opening(&self) -> &'a str {
        match &self.body {
            Some(range) => &self.source[..range.start],
            None => self.source,
        }
    }

    /// Closing marker of a paired block, exactly as written.
    #[must_use]
    pub fn closing_marker(&self) -> Option<&'a str> {
        self.body.as_ref().map(|range| &self.source[range.end..])
    }
}

/// Kind of block comment delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelimiterKind {
    Opener,
    Closer,
    SelfClosing,
}

/// A block comment found while scanning.
#[derive(Debug, Clone, Copy)]
struct Delimiter<'a> {
    start: usize,
    end: usize,
    name: &'a str,
    kind: DelimiterKind,
}

/// Compiled block grammar for one comment namespace.
#[derive(Debug, Clone)]
pub struct BlockGrammar {
    namespace: String,
    delimiter: Regex,
    self_closing: Regex,
    paired: Regex,
}

impl Default for BlockGrammar {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE).expect("default block namespace is valid")
    }
}

impl BlockGrammar {
    /// Compile the grammar for `namespace` (`wp` for `<!-- wp:image -->`).
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidNamespace`] unless the namespace
    /// matches `[a-z][a-z0-9_-]*`.
    pub fn new(namespace: &str) -> Result<Self, GrammarError> {
        if !is_valid_namespace(namespace) {
            return Err(GrammarError::InvalidNamespace(namespace.to_owned()));
        }
        let ns = regex::escape(namespace);

        let delimiter = Regex::new(&format!(
            r"(?s)<!--\s+(/)?{ns}:({NAME_PATTERN})\s+(?:(\{{.*?\}})\s+)?(/)?-->"
        ))?;
        let self_closing = Regex::new(&format!(
            r"(?s)\A<!--\s+{ns}:({NAME_PATTERN})\s+(?:(\{{.*?\}})\s+)?/-->\z"
        ))?;
        let paired = Regex::new(&format!(
            r"(?s)\A<!--\s+{ns}:({NAME_PATTERN})\s+(?:(\{{.*?\}})\s+)?-->(?:\r?\n)?(.*)<!--\s+/{ns}:({NAME_PATTERN})\s+-->\z"
        ))?;

        Ok(Self {
            namespace: namespace.to_owned(),
            delimiter,
            self_closing,
            paired,
        })
    }

    /// Split a span into name, attributes and body using the expected shape.
    ///
    /// Any capture that is missing or inconsistent (closing name differs from
    /// the opening name, a header that swallowed another comment) is a
    /// [`BlockError::GrammarMismatch`]; partial matches are not inspected.
    pub fn split<'a>(&self, span: &'a str, shape: BlockShape) -> Result<BlockParts<'a>, BlockError> {
        match shape {
            BlockShape::SelfClosing => {
                let caps = self
                    .self_closing
                    .captures(span)
                    .ok_or(BlockError::GrammarMismatch)?;
                let name = caps.get(1).ok_or(BlockError::GrammarMismatch)?.as_str();
                let attributes = caps.get(2).map(|m| m.as_str());
                if attributes.is_some_and(|attrs| attrs.contains("-->")) {
                    return Err(BlockError::GrammarMismatch);
                }
                Ok(BlockParts {
                    source: span,
                    name,
                    attributes,
                    body: None,
                })
            }
            BlockShape::Paired => {
                let caps = self.paired.captures(span).ok_or(BlockError::GrammarMismatch)?;
                let (Some(name), Some(body), Some(closing_name)) = (caps.get(1), caps.get(3), caps.get(4))
                else {
                    return Err(BlockError::GrammarMismatch);
                };
                let attributes = caps.get(2).map(|m| m.as_str());
                if name.as_str() != closing_name.as_str()
                    || attributes.is_some_and(|attrs| attrs.contains("-->"))
                {
                    return Err(BlockError::GrammarMismatch);
                }
                Ok(BlockParts {
                    source: span,
                    name: name.as_str(),
                    attributes,
                    body: Some(body.range()),
                })
            }
        }
    }

    /// Find top-level block spans in source order.
    ///
    /// Openers are paired with closers by nesting depth. A stray closer, or an
    /// opener whose nested blocks do not close in order, is left as text, and
    /// complete blocks inside it are reported as top-level spans instead.
    /// Runs in one pass over the delimiters.
    #[must_use]
    pub fn scan(&self, text: &str) -> Vec<RawBlockSpan> {
        let mut collector = SpanCollector::default();

        for delimiter in self.delimiters(text) {
            match delimiter.kind {
                DelimiterKind::SelfClosing => collector.push(RawBlockSpan {
                    start: delimiter.start,
                    end: delimiter.end,
                    name: delimiter.name.to_owned(),
                    self_closing: true,
                }),
                DelimiterKind::Opener => collector.open(delimiter),
                DelimiterKind::Closer => collector.close(delimiter),
            }
        }

        collector.finish()
    }

    /// Reassemble a self-closing header.
    #[must_use]
    pub fn self_closing_header(&self, name: &str, attributes: &str) -> String {
        format!("<!-- {}:{name} {attributes} /-->", self.namespace)
    }

    /// Reassemble an opening header, including the newline before the body.
    #[must_use]
    pub fn opening_header(&self, name: &str, attributes: &str) -> String {
        format!("<!-- {}:{name} {attributes} -->\n", self.namespace)
    }

    /// Tokenize every block delimiter in `text`.
    fn delimiters<'a>(&self, text: &'a str) -> Vec<Delimiter<'a>> {
        let mut found = Vec::new();
        let mut pos = 0;

        while let Some(caps) = self.delimiter.captures_at(text, pos) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                break;
            };
            // A lazy attribute match that ran into another comment is not a header
            if caps.get(3).is_some_and(|attrs| attrs.as_str().contains("-->")) {
                pos = whole.start() + "<!--".len();
                continue;
            }
            let kind = if caps.get(1).is_some() {
                DelimiterKind::Closer
            } else if caps.get(4).is_some() {
                DelimiterKind::SelfClosing
            } else {
                DelimiterKind::Opener
            };
            found.push(Delimiter {
                start: whole.start(),
                end: whole.end(),
                name: name.as_str(),
                kind,
            });
            pos = whole.end();
        }

        found
    }
}

/// A paired block whose closer has not been seen yet.
#[derive(Debug)]
struct OpenBlock<'a> {
    opener: Delimiter<'a>,
    /// Complete blocks directly inside, reported if this block never closes.
    inner: Vec<RawBlockSpan>,
}

/// Stack of open blocks; complete blocks are attached to the innermost one.
#[derive(Debug, Default)]
struct SpanCollector<'a> {
    spans: Vec<RawBlockSpan>,
    open: Vec<OpenBlock<'a>>,
}

impl<'a> SpanCollector<'a> {
    fn push(&mut self, span: RawBlockSpan) {
        match self.open.last_mut() {
            Some(block) => block.inner.push(span),
            None => self.spans.push(span),
        }
    }

    fn open(&mut self, opener: Delimiter<'a>) {
        self.open.push(OpenBlock {
            opener,
            inner: Vec::new(),
        });
    }

    fn close(&mut self, closer: Delimiter<'a>) {
        match self.open.pop() {
            Some(block) if block.opener.name == closer.name => self.push(RawBlockSpan {
                start: block.opener.start,
                end: closer.end,
                name: block.opener.name.to_owned(),
                self_closing: false,
            }),
            Some(block) => {
                tracing::debug!(
                    block = block.opener.name,
                    closer = closer.name,
                    offset = closer.start,
                    "Block closed out of order"
                );
                self.open.push(block);
                self.abandon_open_blocks();
            }
            None => {
                tracing::trace!(block = closer.name, offset = closer.start, "Stray block closer");
            }
        }
    }

    /// Leave every open block as text and promote its complete inner blocks.
    fn abandon_open_blocks(&mut self) {
        for block in self.open.drain(..) {
            tracing::debug!(
                block = block.opener.name,
                offset = block.opener.start,
                "Block has no matching closer, leaving as text"
            );
            self.spans.extend(block.inner);
        }
    }

    fn finish(mut self) -> Vec<RawBlockSpan> {
        self.abandon_open_blocks();
        self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grammar() -> BlockGrammar {
        BlockGrammar::default()
    }

    fn span_texts<'a>(text: &'a str, spans: &[RawBlockSpan]) -> Vec<&'a str> {
        spans.iter().map(|span| span.text(text)).collect()
    }

    #[test]
    fn test_split_self_closing() {
        let parts = grammar()
            .split(r#"<!-- wp:image {"id":"local-1"} /-->"#, BlockShape::SelfClosing)
            .unwrap();
        assert_eq!(parts.name, "image");
        assert_eq!(parts.attributes, Some(r#"{"id":"local-1"}"#));
        assert_eq!(parts.body(), None);
        assert_eq!(parts.closing_marker(), None);
    }

    #[test]
    fn test_split_self_closing_without_attributes() {
        let parts = grammar()
            .split("<!-- wp:more /-->", BlockShape::SelfClosing)
            .unwrap();
        assert_eq!(parts.name, "more");
        assert_eq!(parts.attributes, None);
    }

    #[test]
    fn test_split_self_closing_rejects_body() {
        let span = r#"<!-- wp:image {"id":1} /--><p>body</p><!-- wp:image {"id":2} /-->"#;
        let err = grammar().split(span, BlockShape::SelfClosing).unwrap_err();
        assert!(matches!(err, BlockError::GrammarMismatch));
    }

    #[test]
    fn test_split_paired() {
        let span = "<!-- wp:image {\"id\":7} -->\n<figure><img src=\"a.jpg\"/></figure>\n<!-- /wp:image -->";
        let parts = grammar().split(span, BlockShape::Paired).unwrap();

        assert_eq!(parts.name, "image");
        assert_eq!(parts.attributes, Some(r#"{"id":7}"#));
        assert_eq!(parts.opening(), "<!-- wp:image {\"id\":7} -->\n");
        assert_eq!(parts.body(), Some("<figure><img src=\"a.jpg\"/></figure>\n"));
        assert_eq!(parts.closing_marker(), Some("<!-- /wp:image -->"));
    }

    #[test]
    fn test_split_paired_namespaced_name() {
        let span = r#"<!-- wp:videopress/video {"guid":"abc"} --><figure></figure><!-- /wp:videopress/video -->"#;
        let parts = grammar().split(span, BlockShape::Paired).unwrap();
        assert_eq!(parts.name, "videopress/video");
        assert_eq!(parts.body(), Some("<figure></figure>"));
    }

    #[test]
    fn test_split_paired_rejects_mismatched_closer() {
        let span = r#"<!-- wp:image {"id":7} --><figure></figure><!-- /wp:video -->"#;
        let err = grammar().split(span, BlockShape::Paired).unwrap_err();
        assert!(matches!(err, BlockError::GrammarMismatch));
    }

    #[test]
    fn test_split_paired_rejects_self_closing_text() {
        let err = grammar()
            .split(r#"<!-- wp:image {"id":7} /-->"#, BlockShape::Paired)
            .unwrap_err();
        assert!(matches!(err, BlockError::GrammarMismatch));
    }

    #[test]
    fn test_split_other_namespace_does_not_match() {
        let err = grammar()
            .split(r#"<!-- acme:image {"id":7} /-->"#, BlockShape::SelfClosing)
            .unwrap_err();
        assert!(matches!(err, BlockError::GrammarMismatch));
    }

    #[test]
    fn test_scan_top_level_spans_in_order() {
        let text = concat!(
            "intro\n",
            "<!-- wp:paragraph -->\n<p>Hi</p>\n<!-- /wp:paragraph -->\n\n",
            "<!-- wp:image {\"id\":1} /-->\n",
            "<!-- wp:gallery {\"linkTo\":\"none\"} -->\n<figure>",
            "<!-- wp:image {\"id\":2} -->\n<figure><img/></figure>\n<!-- /wp:image -->",
            "</figure>\n<!-- /wp:gallery -->",
            "\noutro",
        );
        let spans = grammar().scan(text);

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].name, "paragraph");
        assert!(!spans[0].self_closing);
        assert_eq!(spans[1].name, "image");
        assert!(spans[1].self_closing);
        assert_eq!(spans[2].name, "gallery");
        assert!(spans[2].text(text).ends_with("<!-- /wp:gallery -->"));
    }

    #[test]
    fn test_scan_nested_same_name_blocks() {
        let text = concat!(
            "<!-- wp:group --><div>",
            "<!-- wp:group --><div>inner</div><!-- /wp:group -->",
            "</div><!-- /wp:group -->",
            "<!-- wp:group --><div>second</div><!-- /wp:group -->",
        );
        let spans = grammar().scan(text);
        assert_eq!(
            span_texts(text, &spans),
            vec![
                "<!-- wp:group --><div><!-- wp:group --><div>inner</div><!-- /wp:group --></div><!-- /wp:group -->",
                "<!-- wp:group --><div>second</div><!-- /wp:group -->",
            ]
        );
    }

    #[test]
    fn test_scan_unterminated_opener_exposes_inner_blocks() {
        let text = r#"<!-- wp:columns --><div><!-- wp:image {"id":3} /--></div>"#;
        let spans = grammar().scan(text);
        assert_eq!(span_texts(text, &spans), vec![r#"<!-- wp:image {"id":3} /-->"#]);
    }

    #[test]
    fn test_scan_ignores_stray_closer() {
        let text = "<!-- /wp:image --><!-- wp:spacer /-->";
        let spans = grammar().scan(text);
        assert_eq!(span_texts(text, &spans), vec!["<!-- wp:spacer /-->"]);
    }

    #[test]
    fn test_scan_ignores_plain_comments() {
        let text = "<!-- just a comment --><p>text</p><!-- more -->";
        assert!(grammar().scan(text).is_empty());
    }

    #[test]
    fn test_scan_skips_header_that_swallows_another_comment() {
        let text = r#"<!-- wp:image {"id":1 --><!-- wp:spacer {"height":"10px"} /-->"#;
        let spans = grammar().scan(text);
        assert_eq!(
            span_texts(text, &spans),
            vec![r#"<!-- wp:spacer {"height":"10px"} /-->"#]
        );
    }

    #[test]
    fn test_custom_namespace() {
        let grammar = BlockGrammar::new("acme").unwrap();
        let text = r#"<!-- wp:image /--><!-- acme:image {"id":1} /-->"#;
        let spans = grammar.scan(text);
        assert_eq!(span_texts(text, &spans), vec![r#"<!-- acme:image {"id":1} /-->"#]);
        assert_eq!(
            grammar.self_closing_header("image", "{}"),
            "<!-- acme:image {} /-->"
        );
    }

    #[test]
    fn test_invalid_namespace() {
        for namespace in ["", "WP", "w p", "wp:"] {
            let err = BlockGrammar::new(namespace).unwrap_err();
            assert!(matches!(err, GrammarError::InvalidNamespace(_)));
        }
    }

    #[test]
    fn test_headers() {
        let grammar = grammar();
        assert_eq!(
            grammar.opening_header("image", r#"{"id":1}"#),
            "<!-- wp:image {\"id\":1} -->\n"
        );
        assert_eq!(
            grammar.self_closing_header("image", r#"{"id":1}"#),
            r#"<!-- wp:image {"id":1} /-->"#
        );
    }

    #[test]
    fn test_split_paired_crlf_after_header() {
        let span = "<!-- wp:image {\"id\":7} -->\r\n<figure></figure>\r\n<!-- /wp:image -->";
        let parts = grammar().split(span, BlockShape::Paired).unwrap();
        assert_eq!(parts.opening(), "<!-- wp:image {\"id\":7} -->\r\n");
        assert_eq!(parts.body(), Some("<figure></figure>\r\n"));
    }

    #[test]
    fn test_scan_out_of_order_closer_keeps_complete_inner_blocks() {
        let text = concat!(
            "<!-- wp:columns --><!-- wp:image {\"id\":1} /-->",
            "<!-- wp:group --><p>x</p><!-- /wp:group -->",
            "<!-- /wp:column -->",
            "<!-- wp:spacer /-->",
        );
        let spans = grammar().scan(text);
        assert_eq!(
            span_texts(text, &spans),
            vec![
                r#"<!-- wp:image {"id":1} /-->"#,
                "<!-- wp:group --><p>x</p><!-- /wp:group -->",
                "<!-- wp:spacer /-->",
            ]
        );
    }

    #[test]
    fn test_scan_unterminated_opener_keeps_nested_pair_whole() {
        let text = "<!-- wp:columns --><!-- wp:column --><!-- wp:image /--><!-- /wp:column -->";
        let spans = grammar().scan(text);
        assert_eq!(
            span_texts(text, &spans),
            vec!["<!-- wp:column --><!-- wp:image /--><!-- /wp:column -->"]
        );
    }

    #[test]
    fn test_scan_many_unterminated_openers() {
        let mut text = "<!-- wp:group -->".repeat(20_000);
        text.push_str("<!-- wp:spacer /-->");
        let spans = grammar().scan(&text);
        assert_eq!(span_texts(&text, &spans), vec!["<!-- wp:spacer /-->"]);
    }
}
