//! Block inner markup as a mutable tree.
//!
//! [`Fragment::parse`] reads the HTML between a block's opening and closing
//! comments, handlers mutate the resulting tree, and [`Fragment::serialize`]
//! writes it back. Untouched nodes re-serialize to equivalent markup with the
//! same elements, attribute order and escaping. A stray `<` or `&` in text is
//! the one exception and comes back escaped.

mod lenient;
mod parser;
mod serializer;
mod tree;

pub use tree::{Element, Fragment, Node};
