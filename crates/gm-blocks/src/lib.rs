//! Media reference rewriting for block editor content.
//!
//! While a post is edited offline, media blocks point at a local placeholder
//! id and a device file URL. Once the upload finishes, [`ContentRewriter`]
//! rewrites every block that references the placeholder so it points at the
//! remote media id and URL instead.
//!
//! # Architecture
//!
//! - [`BlockGrammar`] finds `<!-- wp:name {json} -->` delimited block spans
//! - [`AttributeMap`] decodes and re-encodes the JSON header
//! - [`Fragment`] parses block inner markup into a mutable tree
//! - [`MediaBlockHandler`] implementations rewrite one block kind each
//! - [`BlockProcessor`] drives one span through those steps and recurses
//!   into container blocks through the rewriter
//!
//! Anything that cannot be interpreted with confidence (invalid JSON, an
//! unexpected shape, markup without the expected media element) is copied
//! through byte for byte.
//!
//! # Example
//!
//! ```
//! use gm_blocks::{ContentRewriter, UploadedMedia};
//!
//! let body = concat!(
//!     "<!-- wp:image {\"id\":12} -->\n",
//!     "<figure class=\"wp-block-image\"><img src=\"file:///photo.jpg\" class=\"wp-image-12\"/></figure>\n",
//!     "<!-- /wp:image -->",
//! );
//! let upload = UploadedMedia {
//!     media_id: "999".to_owned(),
//!     file_url: "https://example.com/photo.jpg".to_owned(),
//!     ..Default::default()
//! };
//!
//! let rewritten = ContentRewriter::default()
//!     .complete_upload(body, "12", &upload)
//!     .unwrap();
//! assert!(rewritten.starts_with("<!-- wp:image {\"id\":999} -->\n"));
//! assert!(rewritten.contains("src=\"https://example.com/photo.jpg\" class=\"wp-image-999\""));
//! ```

mod attributes;
mod error;
mod fragment;
mod grammar;
pub mod handler;
mod media;
mod processor;
mod rewriter;

pub use attributes::AttributeMap;
pub use error::{
    AttributeError, BlockError, FragmentError, GrammarError, MediaError, NumericCoercionError,
};
pub use fragment::{Element, Fragment, Node};
pub use grammar::{BlockGrammar, BlockParts, BlockShape, DEFAULT_NAMESPACE, RawBlockSpan};
pub use handler::{BlockKind, MediaBlockHandler};
pub use media::{MediaReference, UploadedMedia, escape_quotes};
pub use processor::{BlockProcessor, RewriteOutcome};
pub use rewriter::{ContentRewriter, DEFAULT_MAX_DEPTH};
