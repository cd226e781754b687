//! Listener registrations and the native handles currently attached for them.

use alloc::collections::BTreeMap;
use core::fmt;

use tracing::trace;

use crate::{
    error::HostError,
    host::{Host, Listener, ListenerKey},
};

/// Registered callbacks plus the live handles attached during the last
/// render pass.
///
/// `live` holds at most one handle per key and only ever contains handles
/// that are attached in the host. Handles leave it exclusively through
/// [`Host::detach_listener`].
pub(crate) struct Listeners<H: Host> {
    registry: BTreeMap<ListenerKey, Listener<H::Event>>,
    live: BTreeMap<ListenerKey, H::Handle>,
}

impl<H: Host> Default for Listeners<H> {
    fn default() -> Self {
        Self {
            registry: BTreeMap::new(),
            live: BTreeMap::new(),
        }
    }
}

impl<H: Host> fmt::Debug for Listeners<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("registered", &self.registry.keys().collect::<Vec<_>>())
            .field("live", &self.live.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<H: Host> Listeners<H> {
    /// Stores `listener` under `key`, replacing any earlier callback. The
    /// host is not touched until the next render.
    pub fn register(&mut self, key: ListenerKey, listener: Listener<H::Event>) {
        if self.registry.insert(key.clone(), listener).is_some() {
            trace!(%key, "listener replaced");
        }
    }

    /// Drops the registration under `key`, releasing its live handle.
    pub fn unregister(&mut self, host: &H, key: &ListenerKey) -> bool {
        self.release_where(host, |live| live == key);
        self.registry.remove(key).is_some()
    }

    pub fn is_registered(&self, key: &ListenerKey) -> bool {
        self.registry.contains_key(key)
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, key: &ListenerKey) -> bool {
        self.live.contains_key(key)
    }

    pub fn release_all(&mut self, host: &H) {
        self.release_where(host, |_| true);
    }

    /// Detaches every live handle whose key `select` accepts.
    pub fn release_where(&mut self, host: &H, mut select: impl FnMut(&ListenerKey) -> bool) {
        let doomed: Vec<_> = self.live.keys().filter(|key| select(key)).cloned().collect();
        for key in doomed {
            if let Some(handle) = self.live.remove(&key) {
                trace!(%key, "releasing listener");
                host.detach_listener(handle);
            }
        }
    }

    pub fn attach_all(&mut self, host: &H) -> Result<(), HostError> {
        self.attach_where(host, |_| true)
    }

    /// Attaches a fresh handle for every registered key accepted by
    /// `select`, releasing any handle still live for that key first.
    pub fn attach_where(
        &mut self,
        host: &H,
        mut select: impl FnMut(&ListenerKey) -> bool,
    ) -> Result<(), HostError> {
        for (key, listener) in &self.registry {
            if !select(key) {
                continue;
            }
            if let Some(stale) = self.live.remove(key) {
                host.detach_listener(stale);
            }
            trace!(%key, "attaching listener");
            let handle = host.attach_listener(&key.element_id, &key.event, listener.clone())?;
            self.live.insert(key.clone(), handle);
        }
        Ok(())
    }
}
