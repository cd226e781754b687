//! The host page collaborator.
//!
//! The tree engine never touches a real document. Everything it needs from
//! the page is expressed by [`Host`], addressed by element id only, so the
//! same tree can be rendered into a browser, an in-memory page or anything
//! else that can look elements up by id.

use alloc::rc::Rc;
use core::fmt;

use crate::error::HostError;

/// A callback invoked when a native event fires on an element.
pub struct Listener<E> {
    callback: Rc<dyn Fn(&E)>,
}

impl<E> Listener<E> {
    /// Wraps a callback.
    pub fn new(callback: impl Fn(&E) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Invokes the callback.
    pub fn call(&self, event: &E) {
        (self.callback)(event);
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<E> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(core::any::type_name::<Self>())
    }
}

/// Key of one listener registration: element id and event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerKey {
    /// Element id the listener is bound to.
    pub element_id: String,
    /// Native event name, e.g. `click`.
    pub event: String,
}

impl ListenerKey {
    /// Creates a key.
    pub fn new(element_id: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            event: event.into(),
        }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.element_id, self.event)
    }
}

/// Operations the engine needs from the page it renders into.
pub trait Host {
    /// Event payload handed to listeners.
    type Event: 'static;
    /// A native listener attachment. Releasing it happens only through
    /// [`Host::detach_listener`].
    type Handle;

    /// Reads the inner markup of an element.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist.
    fn inner_html(&self, id: &str) -> Result<String, HostError>;

    /// Replaces the inner markup of an element.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist.
    fn set_inner_html(&self, id: &str, markup: &str) -> Result<(), HostError>;

    /// Reads the outer markup of an element, its own tag included.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist.
    fn outer_html(&self, id: &str) -> Result<String, HostError>;

    /// Replaces an element, its own tag included, with `markup`.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist.
    fn set_outer_html(&self, id: &str, markup: &str) -> Result<(), HostError>;

    /// Attaches `listener` for `event` on the element with the given id.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist or refuses the listener.
    fn attach_listener(
        &self,
        id: &str,
        event: &str,
        listener: Listener<Self::Event>,
    ) -> Result<Self::Handle, HostError>;

    /// Detaches and releases a handle. The element may already be gone.
    fn detach_listener(&self, handle: Self::Handle);

    /// Reads the current value of a form control.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist or is not a form control.
    fn value(&self, id: &str) -> Result<String, HostError>;
}
