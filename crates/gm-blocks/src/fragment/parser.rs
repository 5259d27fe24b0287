//! Lenient HTML fragment parser built on quick-xml.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::lenient::escape_stray_markup;
use super::tree::{Element, Fragment, Node, is_void_element};
use crate::error::FragmentError;

impl Fragment {
    /// Parse block inner markup.
    ///
    /// The input is a fragment, not a document: no wrapper is added and none
    /// is expected. End tags are matched leniently and void elements never
    /// take children. Text and attribute values keep their source escaping,
    /// except that a stray `<` or `&` in text is stored as `&lt;` or `&amp;`.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be tokenized, has a tag with an
    /// invalid name or is not valid UTF-8.
    pub fn parse(html: &str) -> Result<Self, FragmentError> {
        let html = escape_stray_markup(html);
        let mut reader = Reader::from_str(&html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut builder = TreeBuilder::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let element = decode_element(&reader, &e, false)?;
                    if is_void_element(&element.tag) {
                        builder.append(Node::Element(element));
                    } else {
                        builder.open(element);
                    }
                }
                Event::Empty(e) => {
                    let element = decode_element(&reader, &e, true)?;
                    builder.append(Node::Element(element));
                }
                Event::End(e) => {
                    let name = e.name();
                    let tag = reader.decoder().decode(name.as_ref())?;
                    builder.close(&tag);
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    builder.push_text(&text);
                }
                Event::GeneralRef(e) => {
                    // Keep entity references exactly as written
                    let entity = reader.decoder().decode(&e)?;
                    builder.push_text(&format!("&{entity};"));
                }
                Event::CData(e) => {
                    let text = reader.decoder().decode(&e)?;
                    builder.append(Node::Raw(format!("<![CDATA[{text}]]>")));
                }
                Event::Comment(e) => {
                    let text = reader.decoder().decode(&e)?;
                    builder.append(Node::Comment(text.into_owned()));
                }
                Event::Decl(e) => {
                    let text = reader.decoder().decode(&e)?;
                    builder.append(Node::Raw(format!("<?{text}?>")));
                }
                Event::PI(e) => {
                    let text = reader.decoder().decode(&e)?;
                    builder.append(Node::Raw(format!("<?{text}?>")));
                }
                Event::DocType(e) => {
                    let text = reader.decoder().decode(&e)?;
                    builder.append(Node::Raw(format!("<!DOCTYPE {}>", text.trim_start())));
                }
                Event::Eof => break,
            }
        }

        Ok(builder.finish())
    }
}

/// Decode tag name and attributes of a start or empty tag.
fn decode_element(
    reader: &Reader<&[u8]>,
    e: &BytesStart,
    self_closing: bool,
) -> Result<Element, FragmentError> {
    let decoder = reader.decoder();
    let name = e.name();
    let tag = decoder.decode(name.as_ref())?.into_owned();
    if !is_valid_tag_name(&tag) {
        return Err(FragmentError::InvalidTagName(tag));
    }

    let mut attrs = Vec::new();
    for attr in e.html_attributes().flatten() {
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let value = std::str::from_utf8(&attr.value)?;
        // Single-quoted source values are re-emitted inside double quotes
        attrs.push((key, value.replace('"', "&quot;")));
    }

    Ok(Element {
        tag,
        attrs,
        children: Vec::new(),
        self_closing,
    })
}

/// Letter followed by letters, digits, `-`, `_`, `.` or `:`.
fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// Stack of open elements; closed elements are attached to their parent.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn current_children(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        }
    }

    fn append(&mut self, node: Node) {
        self.current_children().push(node);
    }

    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    /// Close the innermost open element named `tag`, closing anything opened
    /// after it. End tags with no open counterpart are dropped.
    fn close(&mut self, tag: &str) {
        let Some(index) = self.open.iter().rposition(|el| el.is(tag)) else {
            tracing::trace!(tag, "Ignoring unmatched end tag");
            return;
        };
        while self.open.len() > index {
            self.close_innermost();
        }
    }

    fn close_innermost(&mut self) {
        if let Some(element) = self.open.pop() {
            self.append(Node::Element(element));
        }
    }

    fn push_text(&mut self, text: &str) {
        let children = self.current_children();
        if let Some(Node::Text(existing)) = children.last_mut() {
            existing.push_str(text);
        } else {
            children.push(Node::Text(text.to_owned()));
        }
    }

    fn finish(mut self) -> Fragment {
        while !self.open.is_empty() {
            self.close_innermost();
        }
        Fragment {
            children: self.root,
        }
    }
}
