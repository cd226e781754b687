//! An in-process [`Host`] backed by a markup string.
//!
//! [`MemoryHost`] keeps the whole page as text and resolves elements by
//! locating their `id` attribute, which is enough for markup produced by the
//! serializer. It records every attached listener until it is detached, so
//! leaked handles stay observable, and it can dispatch events to the
//! listeners bound to the element currently carrying an id.

use alloc::collections::BTreeMap;
use core::{cell::RefCell, ops::Range};

use crate::{
    error::HostError,
    host::{Host, Listener},
    markup::escape_into,
};

/// Event payload delivered by [`MemoryHost::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEvent {
    /// Id of the element the event fired on.
    pub target: String,
    /// Event name.
    pub event: String,
}

/// Handle of a listener attached to a [`MemoryHost`].
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryHandle(u64);

#[derive(Debug)]
struct Attached {
    element_id: String,
    event: String,
    generation: u64,
    listener: Listener<MemoryEvent>,
}

#[derive(Debug, Default)]
struct Page {
    markup: String,
    generations: BTreeMap<String, u64>,
    values: BTreeMap<String, String>,
    listeners: BTreeMap<u64, Attached>,
    next_handle: u64,
    next_generation: u64,
}

/// Byte ranges of one element inside the page markup.
struct Located {
    outer: Range<usize>,
    inner: Range<usize>,
}

impl Page {
    fn locate(&self, id: &str) -> Option<Located> {
        let needle = id_attribute(id);
        let at = self.markup.find(&needle)?;
        let start = self.markup[..at].rfind('<')?;
        let tag_end = self.markup[start + 1..]
            .find([' ', '>'])
            .map(|offset| start + 1 + offset)?;
        let tag = &self.markup[start + 1..tag_end];
        let open_end = self.markup[at..].find('>').map(|offset| at + offset + 1)?;

        let open = format!("<{tag}");
        let close = format!("</{tag}>");
        let mut depth = 1usize;
        let mut cursor = open_end;
        loop {
            let rest = &self.markup[cursor..];
            let next_close = rest.find(&close)?;
            let next_open = rest
                .match_indices(&open)
                .find(|(offset, _)| {
                    matches!(rest.as_bytes().get(offset + open.len()), Some(b' ' | b'>'))
                })
                .map(|(offset, _)| offset);
            match next_open {
                Some(offset) if offset < next_close => {
                    depth += 1;
                    cursor += offset + open.len();
                }
                _ => {
                    depth -= 1;
                    if depth == 0 {
                        let close_start = cursor + next_close;
                        return Some(Located {
                            outer: start..close_start + close.len(),
                            inner: open_end..close_start,
                        });
                    }
                    cursor += next_close + close.len();
                }
            }
        }
    }

    fn locate_or_err(&self, id: &str) -> Result<Located, HostError> {
        self.locate(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))
    }

    /// Replaces `range` and treats every element on either side of the edit
    /// as a new element instance.
    fn splice(&mut self, range: Range<usize>, markup: &str) {
        let mut touched = ids_in(&self.markup[range.clone()]);
        touched.extend(ids_in(markup));
        self.markup.replace_range(range, markup);
        for id in touched {
            self.next_generation += 1;
            self.generations.insert(id, self.next_generation);
        }
    }

    fn generation(&self, id: &str) -> u64 {
        self.generations.get(id).copied().unwrap_or_default()
    }
}

fn ids_in(markup: &str) -> Vec<String> {
    const NEEDLE: &str = " id=\"";
    markup
        .match_indices(NEEDLE)
        .filter_map(|(at, _)| {
            let rest = &markup[at + NEEDLE.len()..];
            rest.find('"').map(|end| unescape(&rest[..end]))
        })
        .collect()
}

/// The ` id="..."` attribute as the serializer writes it.
fn id_attribute(id: &str) -> String {
    let mut attribute = String::from(" id=\"");
    escape_into(id, &mut attribute);
    attribute.push('"');
    attribute
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// A host page living entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    page: RefCell<Page>,
}

impl MemoryHost {
    /// Creates an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty `<div>` with the given id to the page, typically used as
    /// a mount anchor.
    #[must_use]
    pub fn with_element(self, id: &str) -> Self {
        {
            let mut page = self.page.borrow_mut();
            let end = page.markup.len();
            let anchor = format!("<div{}></div>", id_attribute(id));
            page.splice(end..end, &anchor);
        }
        self
    }

    /// Returns the full page markup.
    #[must_use]
    pub fn markup(&self) -> String {
        self.page.borrow().markup.clone()
    }

    /// Returns `true` if an element with the given id is on the page.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.page.borrow().locate(id).is_some()
    }

    /// Sets the value reported for a form control.
    pub fn set_value(&self, id: &str, value: impl Into<String>) {
        self.page
            .borrow_mut()
            .values
            .insert(id.to_string(), value.into());
    }

    /// Number of listener handles attached and not yet detached.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.page.borrow().listeners.len()
    }

    /// Number of handles attached for `event` on `id` and not yet detached,
    /// whether or not the element they were bound to still exists.
    #[must_use]
    pub fn attached_count(&self, id: &str, event: &str) -> usize {
        self.page
            .borrow()
            .listeners
            .values()
            .filter(|attached| attached.element_id == id && attached.event == event)
            .count()
    }

    /// Fires `event` on the element currently carrying `id`, returning how
    /// many listeners ran. Listeners bound to an earlier element with the
    /// same id do not run.
    pub fn dispatch(&self, id: &str, event: &str) -> usize {
        let listeners: Vec<_> = {
            let page = self.page.borrow();
            if page.locate(id).is_none() {
                return 0;
            }
            let generation = page.generation(id);
            page.listeners
                .values()
                .filter(|attached| {
                    attached.element_id == id
                        && attached.event == event
                        && attached.generation == generation
                })
                .map(|attached| attached.listener.clone())
                .collect()
        };
        let payload = MemoryEvent {
            target: id.to_string(),
            event: event.to_string(),
        };
        for listener in &listeners {
            listener.call(&payload);
        }
        listeners.len()
    }
}

impl Host for MemoryHost {
    type Event = MemoryEvent;
    type Handle = MemoryHandle;

    fn inner_html(&self, id: &str) -> Result<String, HostError> {
        let page = self.page.borrow();
        let located = page.locate_or_err(id)?;
        Ok(page.markup[located.inner].to_string())
    }

    fn set_inner_html(&self, id: &str, markup: &str) -> Result<(), HostError> {
        let mut page = self.page.borrow_mut();
        let located = page.locate_or_err(id)?;
        page.splice(located.inner, markup);
        Ok(())
    }

    fn outer_html(&self, id: &str) -> Result<String, HostError> {
        let page = self.page.borrow();
        let located = page.locate_or_err(id)?;
        Ok(page.markup[located.outer].to_string())
    }

    fn set_outer_html(&self, id: &str, markup: &str) -> Result<(), HostError> {
        let mut page = self.page.borrow_mut();
        let located = page.locate_or_err(id)?;
        page.splice(located.outer, markup);
        Ok(())
    }

    fn attach_listener(
        &self,
        id: &str,
        event: &str,
        listener: Listener<MemoryEvent>,
    ) -> Result<MemoryHandle, HostError> {
        let mut page = self.page.borrow_mut();
        page.locate_or_err(id)?;
        let generation = page.generation(id);
        page.next_handle += 1;
        let handle = page.next_handle;
        page.listeners.insert(
            handle,
            Attached {
                element_id: id.to_string(),
                event: event.to_string(),
                generation,
                listener,
            },
        );
        Ok(MemoryHandle(handle))
    }

    fn detach_listener(&self, handle: MemoryHandle) {
        self.page.borrow_mut().listeners.remove(&handle.0);
    }

    fn value(&self, id: &str) -> Result<String, HostError> {
        let page = self.page.borrow();
        page.locate_or_err(id)?;
        page.values
            .get(id)
            .cloned()
            .ok_or_else(|| HostError::NotAFormControl(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn inner_and_outer_markup_resolve_nested_elements() {
        let host = MemoryHost::new().with_element("app");
        host.set_inner_html("app", "<ul id=\"list\"><li id=\"a\">A<ul><li>x</li></ul></li><li>B</li></ul>")
            .unwrap();
        assert_eq!(
            host.outer_html("a").unwrap(),
            "<li id=\"a\">A<ul><li>x</li></ul></li>"
        );
        assert_eq!(host.inner_html("list").unwrap(), "<li id=\"a\">A<ul><li>x</li></ul></li><li>B</li>");

        host.set_outer_html("a", "<li id=\"a\">Z</li>").unwrap();
        assert_eq!(
            host.markup(),
            "<div id=\"app\"><ul id=\"list\"><li id=\"a\">Z</li><li>B</li></ul></div>"
        );
    }

    #[test]
    fn missing_elements_are_reported() {
        let host = MemoryHost::new();
        assert_eq!(
            host.inner_html("ghost"),
            Err(HostError::ElementNotFound("ghost".into()))
        );
    }

    #[test]
    fn listeners_on_replaced_elements_stop_firing_but_stay_counted() {
        let host = MemoryHost::new().with_element("app");
        host.set_inner_html("app", "<button id=\"go\"></button>").unwrap();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let handle = host
            .attach_listener("go", "click", Listener::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();
        assert_eq!(host.dispatch("go", "click"), 1);

        host.set_inner_html("app", "<button id=\"go\"></button>").unwrap();
        assert_eq!(host.dispatch("go", "click"), 0);
        assert_eq!(host.attached_count("go", "click"), 1);

        host.detach_listener(handle);
        assert_eq!(host.handle_count(), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn ids_are_matched_in_their_escaped_form() {
        let host = MemoryHost::new().with_element("a<b");
        assert_eq!(host.markup(), "<div id=\"a&lt;b\"></div>");
        host.set_inner_html("a<b", "<p id=\"x&amp;y\">z</p>").unwrap();
        assert_eq!(host.inner_html("x&y").unwrap(), "z");
        assert!(!host.contains("x&amp;y"));

        let handle = host
            .attach_listener("x&y", "click", Listener::new(|_| {}))
            .unwrap();
        assert_eq!(host.dispatch("x&y", "click"), 1);
        host.detach_listener(handle);
    }

    #[test]
    fn values_require_a_form_control() {
        let host = MemoryHost::new().with_element("name");
        assert!(matches!(host.value("name"), Err(HostError::NotAFormControl(_))));
        host.set_value("name", "Ada");
        assert_eq!(host.value("name").unwrap(), "Ada");
    }
}
