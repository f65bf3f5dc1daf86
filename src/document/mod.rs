//! Read-only document trees.
//!
//! The reconstruction core only needs one capability from a parsed document:
//! "give me the children of `node` named `tag`", plus the text of a node. `DocNode`
//! captures exactly that, so any tree representation can feed the core.
//!
//! - `xml`: an immutable tree built from provider XML bytes

pub mod xml;

pub use xml::{DocumentError, XmlNode};

/// Minimal navigation contract over an immutable tree.
pub trait DocNode {
    /// Local element name (no namespace prefix).
    fn tag(&self) -> &str;

    /// Text directly under this node, trimmed. Empty when the node has none.
    fn text(&self) -> &str;

    /// Direct children named `tag`, in document order.
    fn children_named(&self, tag: &str) -> Vec<&Self>;

    /// First direct child named `tag`.
    fn first_child(&self, tag: &str) -> Option<&Self> {
        self.children_named(tag).into_iter().next()
    }
}
