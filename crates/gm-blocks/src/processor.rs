//! Per-span block processing.
//!
//! A span moves through split, attribute check, markup check and reassembly.
//! Any step that cannot confidently interpret the block yields
//! [`RewriteOutcome::Unchanged`] and the caller copies the span verbatim.

use crate::attributes::AttributeMap;
use crate::error::BlockError;
use crate::fragment::Fragment;
use crate::grammar::{BlockParts, BlockShape};
use crate::handler::{BlockKind, MediaBlockHandler};
use crate::media::MediaReference;
use crate::rewriter::ContentRewriter;

/// Result of processing one block span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Replacement text for the span.
    Rewritten(String),
    /// Span must be copied unchanged.
    Unchanged,
}

/// Processes block spans found at one nesting depth.
///
/// Holds the rewriter it came from so that container blocks can hand their
/// body back to it one level deeper.
pub struct BlockProcessor<'a> {
    rewriter: &'a ContentRewriter,
    media: &'a MediaReference,
    depth: usize,
}

impl<'a> BlockProcessor<'a> {
    /// Create a processor for spans at `depth` (0 for top-level blocks).
    #[must_use]
    pub fn new(rewriter: &'a ContentRewriter, media: &'a MediaReference, depth: usize) -> Self {
        Self {
            rewriter,
            media,
            depth,
        }
    }

    /// Process one span of the given shape.
    ///
    /// Never fails: errors are logged and reported as
    /// [`RewriteOutcome::Unchanged`].
    #[must_use]
    pub fn process(&self, span: &str, shape: BlockShape) -> RewriteOutcome {
        match self.try_process(span, shape) {
            Ok(outcome) => outcome,
            Err(BlockError::GrammarMismatch) => {
                tracing::debug!(depth = self.depth, ?shape, "Span does not match block grammar");
                RewriteOutcome::Unchanged
            }
            Err(e) => {
                let source = std::error::Error::source(&e).map(ToString::to_string);
                tracing::warn!(depth = self.depth, error = %e, ?source, "Leaving block unchanged");
                RewriteOutcome::Unchanged
            }
        }
    }

    fn try_process(&self, span: &str, shape: BlockShape) -> Result<RewriteOutcome, BlockError> {
        let parts = self.rewriter.grammar().split(span, shape)?;
        let kind = BlockKind::from_name(parts.name);
        let mut handler = kind.handler();

        let Some(raw_attributes) = parts.attributes else {
            return self.process_inner_blocks(&parts, handler.as_ref());
        };
        let mut attrs = AttributeMap::decode(raw_attributes)?;

        if !handler.apply_attributes(&mut attrs, self.media) {
            return self.process_inner_blocks(&parts, handler.as_ref());
        }
        tracing::trace!(block = parts.name, ?kind, depth = self.depth, "Block references local media");

        let grammar = self.rewriter.grammar();
        let encoded = attrs.encode();
        let (Some(body), Some(closing)) = (parts.body(), parts.closing_marker()) else {
            return Ok(RewriteOutcome::Rewritten(
                grammar.self_closing_header(parts.name, &encoded),
            ));
        };

        let mut fragment = Fragment::parse(body)?;
        if !handler.apply_fragment(&mut fragment, self.media) {
            tracing::debug!(block = parts.name, "Block markup has no media to rewrite");
            return Ok(RewriteOutcome::Unchanged);
        }

        Ok(RewriteOutcome::Rewritten(format!(
            "{}{}{closing}",
            grammar.opening_header(parts.name, &encoded),
            fragment.serialize(),
        )))
    }

    /// Rewrite blocks nested in a paired block that did not match itself.
    ///
    /// The header and closing marker are kept byte for byte.
    fn process_inner_blocks(
        &self,
        parts: &BlockParts<'_>,
        handler: &dyn MediaBlockHandler,
    ) -> Result<RewriteOutcome, BlockError> {
        if !handler.supports_inner_blocks() {
            return Ok(RewriteOutcome::Unchanged);
        }
        let (Some(body), Some(closing)) = (parts.body(), parts.closing_marker()) else {
            return Ok(RewriteOutcome::Unchanged);
        };

        let inner = self.rewriter.rewrite_blocks(body, self.media, self.depth + 1)?;
        if inner == body {
            return Ok(RewriteOutcome::Unchanged);
        }
        Ok(RewriteOutcome::Rewritten(format!(
            "{}{inner}{closing}",
            parts.opening()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_media;
    use pretty_assertions::assert_eq;

    fn process(span: &str, shape: BlockShape) -> RewriteOutcome {
        let rewriter = ContentRewriter::default();
        let media = test_media();
        BlockProcessor::new(&rewriter, &media, 0).process(span, shape)
    }

    #[test]
    fn test_self_closing_match() {
        let outcome = process(r#"<!-- wp:image {"id":12,"sizeSlug":"large"} /-->"#, BlockShape::SelfClosing);
        assert_eq!(
            outcome,
            RewriteOutcome::Rewritten(r#"<!-- wp:image {"id":999,"sizeSlug":"large"} /-->"#.to_owned())
        );
    }

    #[test]
    fn test_paired_match() {
        let span = concat!(
            "<!-- wp:image {\"id\":12} -->\n",
            "<figure class=\"wp-block-image\"><img src=\"file:///photo.jpg\" class=\"wp-image-12\"/></figure>\n",
            "<!-- /wp:image -->"
        );
        let outcome = process(span, BlockShape::Paired);
        assert_eq!(
            outcome,
            RewriteOutcome::Rewritten(
                concat!(
                    "<!-- wp:image {\"id\":999} -->\n",
                    "<figure class=\"wp-block-image\"><img src=\"https://example.com/wp-content/uploads/photo.jpg\" class=\"wp-image-999\"/></figure>\n",
                    "<!-- /wp:image -->"
                )
                .to_owned()
            )
        );
    }

    #[test]
    fn test_invalid_json_is_unchanged() {
        let outcome = process(r#"<!-- wp:image {"id":12,} /-->"#, BlockShape::SelfClosing);
        assert_eq!(outcome, RewriteOutcome::Unchanged);
    }

    #[test]
    fn test_wrong_shape_is_unchanged() {
        let outcome = process(r#"<!-- wp:image {"id":12} /-->"#, BlockShape::Paired);
        assert_eq!(outcome, RewriteOutcome::Unchanged);
    }

    #[test]
    fn test_markup_without_media_is_unchanged() {
        let span = "<!-- wp:image {\"id\":12} -->\n<figure class=\"wp-block-image\"></figure>\n<!-- /wp:image -->";
        assert_eq!(process(span, BlockShape::Paired), RewriteOutcome::Unchanged);
    }

    #[test]
    fn test_non_nesting_kind_does_not_recurse() {
        let span = concat!(
            "<!-- wp:image {\"id\":5} -->\n<figure>",
            "<!-- wp:image {\"id\":12} /-->",
            "</figure>\n<!-- /wp:image -->"
        );
        assert_eq!(process(span, BlockShape::Paired), RewriteOutcome::Unchanged);
    }

    #[test]
    fn test_attribute_less_container_recurses() {
        let span = concat!(
            "<!-- wp:column -->\n<div class=\"wp-block-column\">",
            "<!-- wp:image {\"id\":12} /-->",
            "</div>\n<!-- /wp:column -->"
        );
        assert_eq!(
            process(span, BlockShape::Paired),
            RewriteOutcome::Rewritten(
                concat!(
                    "<!-- wp:column -->\n<div class=\"wp-block-column\">",
                    "<!-- wp:image {\"id\":999} /-->",
                    "</div>\n<!-- /wp:column -->"
                )
                .to_owned()
            )
        );
    }

    #[test]
    fn test_container_without_match_is_unchanged() {
        let span = "<!-- wp:group {\"layout\":{\"type\":\"constrained\"}} -->\n<div></div>\n<!-- /wp:group -->";
        assert_eq!(process(span, BlockShape::Paired), RewriteOutcome::Unchanged);
    }
}
