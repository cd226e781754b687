//! Mounting trees into a host and keeping their listeners in step with the
//! markup they were attached to.
//!
//! Native handles belong to the markup they were attached to. A full render
//! replaces all of that markup, so every handle held by the tree and by its
//! grafted trees is released before the new markup is installed and
//! re-attached right after. A partial render replaces one element, so only
//! the handles bound inside it are rebuilt.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    error::{Error, Result},
    host::Host,
    node::NodeId,
    tree::Tree,
};

impl<H: Host> Tree<H> {
    /// Binds this tree to the host element `anchor` and renders it.
    ///
    /// # Errors
    ///
    /// Fails if the host cannot find `anchor` or refuses a listener.
    pub fn mount(&mut self, host: &H, anchor: impl Into<String>) -> Result<()> {
        let anchor = anchor.into();
        debug!(root = self.id(), %anchor, "mounting tree");
        self.host_anchor = Some(anchor);
        self.render(host)
    }

    /// Replaces the content of the host anchor with this tree's markup and
    /// rebuilds every native listener of this tree and its grafted trees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMounted`] before [`Tree::mount`], or the host's
    /// error if the markup or a listener cannot be installed.
    pub fn render(&mut self, host: &H) -> Result<()> {
        let anchor = self.host_anchor.clone().ok_or(Error::NotMounted)?;
        let markup = self.to_html();
        self.release_listeners(host);
        host.set_inner_html(&anchor, &markup)?;
        self.attach_listeners(host)?;
        debug!(
            root = self.id(),
            %anchor,
            bytes = markup.len(),
            handles = self.live_handle_count(),
            "full render"
        );
        Ok(())
    }

    /// Re-renders the single element `id` in place.
    ///
    /// Only listeners bound inside the replaced element are rebuilt: this
    /// tree's own listeners on elements of that subtree, and every listener
    /// of the trees grafted anywhere below it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMounted`] before [`Tree::mount`],
    /// [`Error::UnknownElementId`] if `id` is not indexed, or the host's error.
    pub fn render_partial(&mut self, host: &H, id: &str) -> Result<()> {
        if self.host_anchor.is_none() {
            return Err(Error::NotMounted);
        }
        let target = self.index_of(id)?;
        let markup = self.element_html(id)?;

        let (inside, anchors) = self.subtree(target);
        self.listeners
            .release_where(host, |key| inside.contains(&key.element_id));
        self.for_each_graft_under(&anchors, |child| {
            child.release_listeners(host);
            Ok(())
        })?;

        host.set_outer_html(id, &markup)?;

        self.listeners
            .attach_where(host, |key| inside.contains(&key.element_id))?;
        self.for_each_graft_under(&anchors, |child| child.attach_listeners(host))?;
        debug!(root = self.id(), %id, bytes = markup.len(), "partial render");
        Ok(())
    }

    /// Releases every handle held by this tree and, recursively, by its
    /// grafted trees.
    pub(crate) fn release_listeners(&mut self, host: &H) {
        self.listeners.release_all(host);
        for grafted in self.grafts.values_mut() {
            for child in grafted.values_mut() {
                child.release_listeners(host);
            }
        }
    }

    /// Attaches every registered listener of this tree and, recursively, of
    /// its grafted trees in document order.
    pub(crate) fn attach_listeners(&mut self, host: &H) -> Result<()> {
        self.listeners.attach_all(host)?;
        let anchors: Vec<String> = self
            .nodes
            .iter()
            .filter(|node| !node.foreign_children.is_empty())
            .map(|node| node.id.clone())
            .collect();
        self.for_each_graft_under(&anchors, |child| child.attach_listeners(host))
    }

    /// Ids indexed inside the subtree rooted at `node`, and the ids of the
    /// anchors in it that carry grafted trees, in document order.
    fn subtree(&self, node: NodeId) -> (BTreeSet<String>, Vec<String>) {
        let mut ids = BTreeSet::new();
        let mut anchors = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if !node.id.is_empty() {
                ids.insert(node.id.clone());
            }
            if !node.foreign_children.is_empty() {
                anchors.push(node.id.clone());
            }
            stack.extend(node.static_children.iter().rev().copied());
        }
        (ids, anchors)
    }

    fn for_each_graft_under(
        &mut self,
        anchors: &[String],
        mut visit: impl FnMut(&mut Self) -> Result<()>,
    ) -> Result<()> {
        for anchor in anchors {
            let Ok(node) = self.index_of(anchor) else {
                continue;
            };
            let Self { nodes, grafts, .. } = &mut *self;
            let Some(grafted) = grafts.get_mut(anchor) else {
                continue;
            };
            for child_id in &nodes[node.0].foreign_children {
                if let Some(child) = grafted.get_mut(child_id) {
                    visit(child)?;
                }
            }
        }
        Ok(())
    }
}
