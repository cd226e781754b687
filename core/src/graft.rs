//! Grafting externally built trees under anchor nodes.
//!
//! These methods are the only mutators of both an anchor's foreign child
//! list and the per-anchor map owning the grafted trees; each of them updates
//! the two together.

use tracing::debug;

use crate::{
    error::{Error, Result},
    host::Host,
    tree::Tree,
};

impl<H: Host> Tree<H> {
    /// Appends `child` to the foreign children of the element `anchor`.
    ///
    /// Nothing is rendered; the graft becomes visible on the next render.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `anchor` is not indexed,
    /// [`Error::AnonymousChild`] if `child` has no root id, and
    /// [`Error::DuplicateId`] if a tree with the same id is already grafted
    /// under `anchor`.
    pub fn attach(&mut self, anchor: &str, mut child: Self) -> Result<()> {
        let node = self.index_of(anchor)?;
        let child_id = child.id().to_string();
        if child_id.is_empty() {
            return Err(Error::AnonymousChild(child.root().tag().to_string()));
        }
        let grafted = self.grafts.entry(anchor.to_string()).or_default();
        if grafted.contains_key(&child_id) {
            return Err(Error::DuplicateId(child_id));
        }

        debug!(%anchor, child = %child_id, "grafting tree");
        child.host_anchor = Some(anchor.to_string());
        grafted.insert(child_id.clone(), child);
        self.nodes[node.0].foreign_children.push(child_id);
        Ok(())
    }

    /// Removes the tree `child_id` from under `anchor` and releases all of
    /// its native listener handles, returning it to the caller.
    ///
    /// Detaching a tree that is not grafted there is a no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `anchor` is not indexed.
    pub fn detach(&mut self, host: &H, anchor: &str, child_id: &str) -> Result<Option<Self>> {
        let node = self.index_of(anchor)?;
        let Some(grafted) = self.grafts.get_mut(anchor) else {
            return Ok(None);
        };
        let Some(mut child) = grafted.remove(child_id) else {
            return Ok(None);
        };
        if grafted.is_empty() {
            self.grafts.remove(anchor);
        }
        self.nodes[node.0]
            .foreign_children
            .retain(|grafted_id| grafted_id != child_id);

        debug!(%anchor, child = %child_id, "detached tree");
        child.release_listeners(host);
        child.host_anchor = None;
        Ok(Some(child))
    }

    /// Detaches every tree grafted under `anchor` in one step, releasing
    /// their handles, and returns them in attachment order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `anchor` is not indexed.
    pub fn clear(&mut self, host: &H, anchor: &str) -> Result<Vec<Self>> {
        let node = self.index_of(anchor)?;
        let order = core::mem::take(&mut self.nodes[node.0].foreign_children);
        let mut grafted = self.grafts.remove(anchor).unwrap_or_default();

        let cleared: Vec<_> = order
            .iter()
            .filter_map(|child_id| grafted.remove(child_id))
            .map(|mut child| {
                child.release_listeners(host);
                child.host_anchor = None;
                child
            })
            .collect();
        if !cleared.is_empty() {
            debug!(%anchor, count = cleared.len(), "cleared grafted trees");
        }
        Ok(cleared)
    }

    /// The tree `child_id` grafted under `anchor`.
    #[must_use]
    pub fn foreign(&self, anchor: &str, child_id: &str) -> Option<&Self> {
        self.grafts.get(anchor)?.get(child_id)
    }

    /// Mutable access to the tree `child_id` grafted under `anchor`, e.g. to
    /// register listeners on it.
    pub fn foreign_mut(&mut self, anchor: &str, child_id: &str) -> Option<&mut Self> {
        self.grafts.get_mut(anchor)?.get_mut(child_id)
    }

    /// Ids of the trees grafted under `anchor`, in attachment order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`] if `anchor` is not indexed.
    pub fn foreign_ids(&self, anchor: &str) -> Result<&[String]> {
        self.node(anchor).map(|node| node.foreign_children())
    }
}
