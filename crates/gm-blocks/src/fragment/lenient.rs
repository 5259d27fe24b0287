//! Repair of stray `<` and `&` in block markup.
//!
//! Browsers read `a < b` and `Tom & Jerry` as text, while the XML tokenizer
//! either fails or mistakes the `<` for a tag. Before tokenizing, every `<`
//! that cannot start markup becomes `&lt;` and every `&` that does not start a
//! character reference becomes `&amp;`. Tags, comments, CDATA sections and
//! declarations are skipped over untouched, so attribute values keep their
//! source bytes.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Named, decimal or hexadecimal character reference at the start of input.
static CHARACTER_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").unwrap()
});

/// Escape stray `<` and `&` outside markup.
///
/// Borrows the input when nothing needs escaping.
pub(super) fn escape_stray_markup(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let mut escaped = String::new();
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let replacement = match bytes[pos] {
            b'<' => match markup_end(bytes, pos) {
                Some(end) => {
                    pos = end;
                    continue;
                }
                None => "&lt;",
            },
            b'&' if !CHARACTER_REFERENCE.is_match(&html[pos..]) => "&amp;",
            _ => {
                pos += 1;
                continue;
            }
        };
        escaped.push_str(&html[copied..pos]);
        escaped.push_str(replacement);
        pos += 1;
        copied = pos;
    }

    if copied == 0 {
        return Cow::Borrowed(html);
    }
    escaped.push_str(&html[copied..]);
    Cow::Owned(escaped)
}

/// End offset of the markup construct starting with the `<` at `start`.
///
/// Returns `None` when the `<` cannot open markup. A construct that never
/// terminates runs to the end of input and is left for the tokenizer to
/// reject.
fn markup_end(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = &bytes[start + 1..];
    let end = if rest.starts_with(b"!--") {
        find_after(bytes, start + 4, b"-->")
    } else if rest.starts_with(b"![CDATA[") {
        find_after(bytes, start + 9, b"]]>")
    } else if rest.starts_with(b"?") {
        find_after(bytes, start + 2, b"?>")
    } else {
        match rest {
            [b'!', next, ..] | [b'/', next, ..] | [next, ..] if next.is_ascii_alphabetic() => {
                tag_end(bytes, start + 1)
            }
            _ => return None,
        }
    };
    Some(end.unwrap_or(bytes.len()))
}

/// Offset just past the first `needle` at or after `from`.
fn find_after(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset + needle.len())
}

/// Offset just past the `>` closing a tag, ignoring `>` inside quotes.
fn tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (offset, &byte) in bytes[from..].iter().enumerate() {
        match (quote, byte) {
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return Some(from + offset + 1),
            (Some(open), _) if open == byte => quote = None,
            _ => {}
        }
    }
    None
}
