//! The addressable root of a constructed template.

use core::fmt;
use std::collections::HashMap;

use tracing::debug;

use crate::{
    attributes::AttrKey,
    error::{Error, Result},
    host::{Host, Listener, ListenerKey},
    listeners::Listeners,
    node::{Node, NodeId},
    schema::{Template, TemplateSchema},
    walker::TreeBuilder,
};

/// Mount state of a [`Tree`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// The tree has not been bound to a host element yet.
    #[default]
    Unmounted,
    /// The tree renders into a host element.
    Mounted,
}

/// A constructed template: the node arena, its id index, its listener
/// registry and the trees grafted under its nodes.
///
/// Every by-id operation addresses ids as they appear in markup, i.e. after
/// the instance suffix has been appended (see [`Tree::scoped_id`]).
pub struct Tree<H: Host> {
    pub(crate) nodes: Vec<Node>,
    pub(crate) suffix: String,
    pub(crate) host_anchor: Option<String>,
    pub(crate) id_index: HashMap<String, NodeId>,
    pub(crate) listeners: Listeners<H>,
    /// Grafted trees, keyed by anchor id and then by the grafted tree's id.
    /// Always mutated together with the anchor node's `foreign_children`.
    pub(crate) grafts: HashMap<String, HashMap<String, Self>>,
}

impl<H: Host> fmt::Debug for Tree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root().id())
            .field("suffix", &self.suffix)
            .field("host_anchor", &self.host_anchor)
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners)
            .field("grafts", &self.grafts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<H: Host> Tree<H> {
    /// Builds a tree from a template type with an empty instance suffix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootDescriptor`] if the template has no `me` field.
    pub fn new<T: Template>() -> Result<Self> {
        TreeBuilder::new().build::<T, H>()
    }

    /// Builds a tree from an explicit schema with an empty instance suffix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootDescriptor`] if the schema has no `me` field.
    pub fn from_schema(schema: &TemplateSchema) -> Result<Self> {
        TreeBuilder::new().build_schema(schema)
    }

    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        id_index: HashMap<String, NodeId>,
        suffix: String,
    ) -> Self {
        Self {
            nodes,
            suffix,
            host_anchor: None,
            id_index,
            listeners: Listeners::default(),
            grafts: HashMap::new(),
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// The id of the root node, which is also the id this tree is grafted
    /// under when attached to another tree.
    #[must_use]
    pub fn id(&self) -> &str {
        self.root().id()
    }

    /// The node at an arena position.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    /// The instance suffix appended to every declared id.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Namespaces a declared id with this tree's instance suffix.
    #[must_use]
    pub fn scoped_id(&self, declared: &str) -> String {
        format!("{declared}{}", self.suffix)
    }

    /// The host element this tree renders into, once mounted or grafted.
    #[must_use]
    pub fn host_anchor(&self) -> Option<&str> {
        self.host_anchor.as_deref()
    }

    /// Current mount state.
    #[must_use]
    pub const fn state(&self) -> TreeState {
        if self.host_anchor.is_some() {
            TreeState::Mounted
        } else {
            TreeState::Unmounted
        }
    }

    /// Returns `true` if `id` is indexed by this tree.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Iterates the indexed ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.id_index.keys().map(String::as_str)
    }

    pub(crate) fn index_of(&self, id: &str) -> Result<NodeId> {
        self.id_index
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownElementId(id.to_string()))
    }

    /// Looks a node up by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `id` is not indexed.
    pub fn node(&self, id: &str) -> Result<&Node> {
        self.index_of(id).map(|node| &self.nodes[node.0])
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        let node = self.index_of(id)?;
        Ok(&mut self.nodes[node.0])
    }

    /// Replaces the text of an element. Visible after the next render.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `id` is not indexed.
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.text = text.into();
        Ok(())
    }

    /// Sets an attribute of an element. Visible after the next render.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `id` is not indexed and
    /// [`Error::ImmutableId`] when `key` is [`AttrKey::Id`].
    pub fn set_attribute(&mut self, id: &str, key: AttrKey, value: impl Into<String>) -> Result<()> {
        if key == AttrKey::Id {
            return Err(Error::ImmutableId(id.to_string()));
        }
        self.node_mut(id)?.attributes.set(key, value);
        Ok(())
    }

    /// Removes an attribute of an element, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `id` is not indexed and
    /// [`Error::ImmutableId`] when `key` is [`AttrKey::Id`].
    pub fn remove_attribute(&mut self, id: &str, key: AttrKey) -> Result<Option<String>> {
        if key == AttrKey::Id {
            return Err(Error::ImmutableId(id.to_string()));
        }
        Ok(self.node_mut(id)?.attributes.remove(key))
    }

    /// Registers `callback` for `event` on the element with the given id,
    /// replacing any callback already registered for that pair.
    ///
    /// Nothing is attached to the host until the next render pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `id` is not indexed.
    pub fn add_event_listener(
        &mut self,
        id: &str,
        event: &str,
        callback: impl Fn(&H::Event) + 'static,
    ) -> Result<()> {
        self.index_of(id)?;
        debug!(id, event, "registering listener");
        self.listeners
            .register(ListenerKey::new(id, event), Listener::new(callback));
        Ok(())
    }

    /// Drops the registration for `event` on `id`, detaching its live handle.
    /// Returns whether a registration existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `id` is not indexed.
    pub fn remove_event_listener(&mut self, host: &H, id: &str, event: &str) -> Result<bool> {
        self.index_of(id)?;
        Ok(self.listeners.unregister(host, &ListenerKey::new(id, event)))
    }

    /// Returns `true` if a callback is registered for `event` on `id`.
    #[must_use]
    pub fn has_listener(&self, id: &str, event: &str) -> bool {
        self.listeners.is_registered(&ListenerKey::new(id, event))
    }

    /// Returns `true` if a native handle is currently attached for `event` on `id`.
    #[must_use]
    pub fn is_listening(&self, id: &str, event: &str) -> bool {
        self.listeners.is_live(&ListenerKey::new(id, event))
    }

    /// Number of native handles this tree currently holds, excluding
    /// grafted trees.
    #[must_use]
    pub fn live_handle_count(&self) -> usize {
        self.listeners.live_len()
    }

    /// Reads the current value of a form control inside this tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `id` is not indexed, or the
    /// host's error if the element cannot report a value.
    pub fn value(&self, host: &H, id: &str) -> Result<String> {
        self.index_of(id)?;
        Ok(host.value(id)?)
    }
}
