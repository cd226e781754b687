//! Elements of a constructed tree.

use crate::attributes::Attributes;

/// Position of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: Self = Self(0);
}

/// One markup element.
///
/// Static children are fixed when the tree is built. Foreign children are
/// the ids of trees grafted under this node, in attachment order; the grafted
/// trees themselves are owned by the enclosing [`Tree`](crate::Tree).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub(crate) tag: String,
    pub(crate) text: String,
    pub(crate) id: String,
    pub(crate) attributes: Attributes,
    pub(crate) static_children: Vec<NodeId>,
    pub(crate) foreign_children: Vec<String>,
}

impl Node {
    /// Element name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Literal text content, emitted before any child.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Namespaced element id; empty when the node is not addressable.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attributes in emission order.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Children declared by the template.
    #[must_use]
    pub fn static_children(&self) -> &[NodeId] {
        &self.static_children
    }

    /// Ids of the trees grafted under this node, in attachment order.
    #[must_use]
    pub fn foreign_children(&self) -> &[String] {
        &self.foreign_children
    }
}
