//! Top-level content rewriter.

use gm_config::Config;

use crate::error::{BlockError, GrammarError, MediaError};
use crate::grammar::BlockGrammar;
use crate::media::{MediaReference, UploadedMedia};
use crate::processor::{BlockProcessor, RewriteOutcome};

/// Default limit for following container blocks into their bodies.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Rewrites post content once a media upload completes.
///
/// Holds only the compiled grammar and settings, so one instance can be
/// shared across threads.
///
/// # Example
///
/// ```
/// use gm_blocks::{ContentRewriter, MediaReference};
///
/// let rewriter = ContentRewriter::default();
/// let media = MediaReference::new("12", "999", "https://example.com/photo.jpg");
///
/// let body = r#"<!-- wp:image {"id":12,"sizeSlug":"large"} /-->"#;
/// assert_eq!(
///     rewriter.rewrite(body, &media),
///     r#"<!-- wp:image {"id":999,"sizeSlug":"large"} /-->"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    grammar: BlockGrammar,
    max_depth: usize,
}

impl Default for ContentRewriter {
    fn default() -> Self {
        Self::new(BlockGrammar::default(), DEFAULT_MAX_DEPTH)
    }
}

impl ContentRewriter {
    /// Create a rewriter from a grammar and a nesting limit.
    #[must_use]
    pub fn new(grammar: BlockGrammar, max_depth: usize) -> Self {
        Self { grammar, max_depth }
    }

    /// Create a rewriter from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] if the configured namespace is invalid.
    pub fn from_config(config: &Config) -> Result<Self, GrammarError> {
        let grammar = BlockGrammar::new(&config.grammar.namespace)?;
        Ok(Self::new(grammar, config.rewrite.max_depth))
    }

    /// Block grammar in use.
    #[must_use]
    pub fn grammar(&self) -> &BlockGrammar {
        &self.grammar
    }

    /// Rewrite every block in `body` that references `media.local_id`.
    ///
    /// Text outside blocks, and any block that does not reference the local
    /// media or cannot be interpreted, is copied unchanged. An empty local id
    /// references nothing, so the body comes back as is.
    #[must_use]
    pub fn rewrite(&self, body: &str, media: &MediaReference) -> String {
        if media.local_id.trim().is_empty() {
            tracing::debug!("Media reference has no local id");
            return body.to_owned();
        }
        if !body.contains(media.local_id.as_str()) {
            tracing::trace!(local_id = %media.local_id, "Body does not mention local media");
            return body.to_owned();
        }

        match self.rewrite_blocks(body, media, 0) {
            Ok(rewritten) => {
                tracing::debug!(
                    local_id = %media.local_id,
                    remote_id = %media.remote_id,
                    changed = rewritten != body,
                    "Rewrote post content"
                );
                rewritten
            }
            Err(e) => {
                tracing::warn!(error = %e, "Leaving post content unchanged");
                body.to_owned()
            }
        }
    }

    /// Rewrite `body` for a finished upload of the media known locally as
    /// `local_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] if `local_id` is blank or the upload has no
    /// remote id or URL.
    pub fn complete_upload(
        &self,
        body: &str,
        local_id: &str,
        upload: &UploadedMedia,
    ) -> Result<String, MediaError> {
        let media = MediaReference::from_upload(local_id, upload)?;
        Ok(self.rewrite(body, &media))
    }

    /// Rewrite the top-level blocks of `text`, which sits `depth` levels deep.
    pub(crate) fn rewrite_blocks(
        &self,
        text: &str,
        media: &MediaReference,
        depth: usize,
    ) -> Result<String, BlockError> {
        if depth > self.max_depth {
            return Err(BlockError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        // Boundaries are fixed before any span is replaced
        let spans = self.grammar.scan(text);
        if spans.is_empty() {
            return Ok(text.to_owned());
        }

        let processor = BlockProcessor::new(self, media, depth);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for span in &spans {
            out.push_str(&text[last..span.start]);
            let original = span.text(text);
            match processor.process(original, span.shape()) {
                RewriteOutcome::Rewritten(replacement) => {
                    tracing::trace!(block = %span.name, depth, "Rewrote block");
                    out.push_str(&replacement);
                }
                RewriteOutcome::Unchanged => out.push_str(original),
            }
            last = span.end;
        }
        out.push_str(&text[last..]);

        Ok(out)
    }
}
