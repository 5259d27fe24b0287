//! Deterministic fragment serializer.

use super::tree::{BOOLEAN_ATTRIBUTES, Element, Fragment, Node, is_void_element};

impl Fragment {
    /// Serialize back to markup.
    ///
    /// Output is compact (no indentation or added whitespace) and contains
    /// only the fragment nodes. Attribute order is kept, elements written as
    /// `<tag/>` in the source keep that form, and void elements are written
    /// without a closing tag.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(1024);
        for node in &self.children {
            serialize_node(node, &mut out);
        }
        out
    }
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(el) => serialize_element(el, out),
        Node::Text(text) | Node::Raw(text) => out.push_str(text),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn serialize_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);

    for (key, value) in &el.attrs {
        out.push(' ');
        out.push_str(key);
        if value.is_empty() && is_boolean_attribute(key) {
            continue;
        }
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }

    if el.self_closing && el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    if is_void_element(&el.tag) && el.children.is_empty() {
        return;
    }

    for child in &el.children {
        serialize_node(child, out);
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn is_boolean_attribute(key: &str) -> bool {
    BOOLEAN_ATTRIBUTES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(key))
}
