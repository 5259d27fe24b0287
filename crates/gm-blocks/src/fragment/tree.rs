//! Mutable tree for block inner markup.

/// HTML elements that never have content or a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Attributes written without a value when empty.
pub(crate) const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "autoplay",
    "controls",
    "default",
    "defer",
    "disabled",
    "download",
    "hidden",
    "loop",
    "muted",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

/// Whether `tag` is an HTML void element.
pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

/// Parsed markup fragment.
///
/// Holds the top-level nodes of a block body. There is no wrapper element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Top-level nodes in source order.
    pub children: Vec<Node>,
}

/// Node in a parsed fragment.
///
/// Text and attribute values are stored exactly as written in the source,
/// entity references included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with attributes and children.
    Element(Element),
    /// Character data.
    Text(String),
    /// Comment body, without the `<!--` `-->` delimiters.
    Comment(String),
    /// Markup kept verbatim (CDATA, doctype, processing instructions).
    Raw(String),
}

/// Markup element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Source used the `<tag />` form.
    pub self_closing: bool,
}

impl Fragment {
    /// First element, depth-first in document order, matching `predicate`.
    pub fn find_mut(&mut self, predicate: impl Fn(&Element) -> bool) -> Option<&mut Element> {
        find_in(&mut self.children, &predicate)
    }

    /// First element matching `predicate`.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        find_ref_in(&self.children, &predicate)
    }

    /// First element with the given tag.
    pub fn find_tag_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.find_mut(|el| el.is(tag))
    }

    /// Visit every element in document order.
    pub fn for_each_element_mut(&mut self, mut visit: impl FnMut(&mut Element)) {
        visit_all(&mut self.children, &mut visit);
    }
}

impl Element {
    /// Create an element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Whether this element has the given tag (ASCII case-insensitive).
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute in place, or append it if missing.
    ///
    /// Double quotes in `value` are escaped so the value cannot end the
    /// attribute early.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        let value = value.replace('"', "&quot;");
        if let Some(slot) = self
            .attrs
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            slot.1 = value;
        } else {
            self.attrs.push((key.to_owned(), value));
        }
    }

    /// Whether the `class` attribute contains `token`.
    #[must_use]
    pub fn has_class(&self, token: &str) -> bool {
        self.attr("class")
            .is_some_and(|class| class.split_ascii_whitespace().any(|t| t == token))
    }

    /// Add a class token if not already present.
    pub fn add_class(&mut self, token: &str) {
        if self.has_class(token) {
            return;
        }
        let class = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {token}"),
            _ => token.to_owned(),
        };
        self.set_attr("class", &class);
    }

    /// Replace class token `from` with `to` at the same position.
    ///
    /// Returns whether `from` was present.
    pub fn replace_class(&mut self, from: &str, to: &str) -> bool {
        if !self.has_class(from) {
            return false;
        }
        let class = self
            .attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
            .map(|t| if t == from { to } else { t })
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", &class);
        true
    }

    /// First descendant element matching `predicate`.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        find_ref_in(&self.children, &predicate)
    }

    /// First descendant element matching `predicate`, mutably.
    pub fn find_mut(&mut self, predicate: impl Fn(&Element) -> bool) -> Option<&mut Element> {
        find_in(&mut self.children, &predicate)
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }
}

fn find_in<'a>(
    nodes: &'a mut [Node],
    predicate: &dyn Fn(&Element) -> bool,
) -> Option<&'a mut Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if predicate(el) {
                return Some(el);
            }
            if let Some(found) = find_in(&mut el.children, predicate) {
                return Some(found);
            }
        }
    }
    None
}

fn find_ref_in<'a>(
    nodes: &'a [Node],
    predicate: &dyn Fn(&Element) -> bool,
) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if predicate(el) {
                return Some(el);
            }
            if let Some(found) = find_ref_in(&el.children, predicate) {
                return Some(found);
            }
        }
    }
    None
}

fn visit_all(nodes: &mut [Node], visit: &mut dyn FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            visit(el);
            visit_all(&mut el.children, visit);
        }
    }
}
