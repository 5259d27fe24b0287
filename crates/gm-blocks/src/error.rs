//! Error types for block rewriting.
//!
//! None of these escape [`ContentRewriter::rewrite`](crate::ContentRewriter::rewrite):
//! every failure leaves the affected span unchanged and is reported via `tracing`.

use std::num::ParseIntError;
use std::str::Utf8Error;

/// Error while splitting or processing a single block span.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BlockError {
    /// Span does not fit the expected block shape.
    #[error("span does not match the block grammar")]
    GrammarMismatch,

    /// Header attributes could not be decoded.
    #[error("invalid block attributes")]
    Attributes(#[from] AttributeError),

    /// Inner markup could not be parsed.
    #[error("invalid block markup")]
    Fragment(#[from] FragmentError),

    /// Nested blocks go deeper than the configured limit.
    #[error("block nesting exceeds {limit} levels")]
    DepthExceeded {
        /// Configured maximum depth.
        limit: usize,
    },
}

/// Error decoding a block attribute header.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AttributeError {
    /// Header is not valid JSON.
    #[error("JSON parse error")]
    Json(#[from] serde_json::Error),

    /// Header is valid JSON but its root is not an object.
    #[error("attributes must be a JSON object")]
    NotAnObject,
}

/// An attribute value that should have been an integer was not.
#[derive(Debug, thiserror::Error)]
#[error("cannot set {key} to non-integer value {value:?}")]
pub struct NumericCoercionError {
    /// Attribute key that was left unmodified.
    pub key: String,
    /// Rejected input.
    pub value: String,
    /// Underlying parse failure.
    #[source]
    pub source: ParseIntError,
}

/// Error parsing block inner markup.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FragmentError {
    /// XML tokenizer error.
    #[error("markup parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// Tag name that cannot start an element.
    #[error("invalid tag name: {0:?}")]
    InvalidTagName(String),

    /// UTF-8 decoding error.
    #[error("UTF-8 error")]
    Utf8(#[from] Utf8Error),

    /// Encoding error while decoding markup.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Error building a block grammar.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarError {
    /// Namespace is not a valid block name segment.
    #[error("invalid block namespace: {0:?}")]
    InvalidNamespace(String),

    /// Generated pattern failed to compile.
    #[error("invalid block pattern")]
    Regex(#[from] regex::Error),
}

/// Error converting an upload result into a media reference.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MediaError {
    /// No local placeholder id to look for.
    #[error("local media id is empty")]
    EmptyLocalId,

    /// Upload finished without a remote media id.
    #[error("uploaded media has no remote id")]
    EmptyMediaId,

    /// Upload finished without a usable URL.
    #[error("uploaded media has no URL")]
    EmptyUrl,
}
