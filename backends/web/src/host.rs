use core::fmt;

use tracing::{trace, warn};
use trellis_core::{Host, HostError, Listener};
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{
    Document, Element, Event, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, Window,
};

use crate::error::{WebError, host_error};

/// The browser document as a [`Host`] for trellis trees.
#[derive(Debug, Clone)]
pub struct WebHost {
    document: Document,
}

impl WebHost {
    /// Binds to the document of the current window.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::DomUnavailable`] outside of a browser.
    pub fn new() -> Result<Self, WebError> {
        let window: Window = web_sys::window().ok_or(WebError::DomUnavailable)?;
        let document = window.document().ok_or(WebError::DomUnavailable)?;
        Ok(Self { document })
    }

    /// Binds to an explicit document.
    #[must_use]
    pub const fn from_document(document: Document) -> Self {
        Self { document }
    }

    /// Returns the owning document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    fn element(&self, id: &str) -> Result<Element, HostError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))
    }
}

/// A DOM event listener attached by [`WebHost`].
///
/// Owns the JavaScript closure; dropping the handle frees it, so it must be
/// removed from its element first through [`Host::detach_listener`].
pub struct WebListener {
    element_id: String,
    event: String,
    closure: Closure<dyn FnMut(Event)>,
}

impl fmt::Debug for WebListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebListener")
            .field("element_id", &self.element_id)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

impl Host for WebHost {
    type Event = Event;
    type Handle = WebListener;

    fn inner_html(&self, id: &str) -> Result<String, HostError> {
        Ok(self.element(id)?.inner_html())
    }

    fn set_inner_html(&self, id: &str, markup: &str) -> Result<(), HostError> {
        self.element(id)?.set_inner_html(markup);
        Ok(())
    }

    fn outer_html(&self, id: &str) -> Result<String, HostError> {
        Ok(self.element(id)?.outer_html())
    }

    fn set_outer_html(&self, id: &str, markup: &str) -> Result<(), HostError> {
        self.element(id)?.set_outer_html(markup);
        Ok(())
    }

    fn attach_listener(
        &self,
        id: &str,
        event: &str,
        listener: Listener<Event>,
    ) -> Result<WebListener, HostError> {
        let element = self.element(id)?;
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| listener.call(&event));
        element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(host_error)?;
        trace!(id, event, "attached DOM listener");
        Ok(WebListener {
            element_id: id.to_string(),
            event: event.to_string(),
            closure,
        })
    }

    fn detach_listener(&self, handle: WebListener) {
        // After a re-render the id may resolve to a fresh element that never
        // saw this closure; removing it there is a no-op.
        if let Some(element) = self.document.get_element_by_id(&handle.element_id) {
            if let Err(error) = element.remove_event_listener_with_callback(
                &handle.event,
                handle.closure.as_ref().unchecked_ref(),
            ) {
                warn!(
                    id = %handle.element_id,
                    event = %handle.event,
                    error = %WebError::from(error),
                    "failed to remove DOM listener"
                );
            }
        }
        trace!(id = %handle.element_id, event = %handle.event, "released DOM listener");
    }

    fn value(&self, id: &str) -> Result<String, HostError> {
        let element = self.element(id)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            Ok(input.value())
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            Ok(area.value())
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            Ok(select.value())
        } else {
            Err(HostError::NotAFormControl(id.to_string()))
        }
    }
}
