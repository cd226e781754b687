#![allow(clippy::multiple_crate_versions)]

//! Core engine of `trellis`.
//!
//! A template is described by a [`TemplateSchema`], usually produced by
//! `#[derive(Template)]`. [`TreeBuilder`] walks the schema into a [`Tree`]:
//! a node arena plus an index from element id to node, so any element that
//! declared an id can be found and mutated in constant time. Trees serialize
//! to markup, mount into a [`Host`] element, and keep the native listener
//! handles they attach in step with the markup they render.
//!
//! Trees built elsewhere can be grafted under any addressable node with
//! [`Tree::attach`], and removed again with [`Tree::detach`] or
//! [`Tree::clear`].
//!
//! ```
//! use trellis_core::{FieldDescriptor, MemoryHost, TemplateSchema, Tree};
//!
//! let schema = TemplateSchema::new("List")
//!     .field(FieldDescriptor::new("me").with("tag", "ul"))
//!     .field(FieldDescriptor::new("item").with("tag", "li").with("id", "first").with("text", "A"));
//!
//! let host = MemoryHost::new().with_element("app");
//! let mut tree = Tree::<MemoryHost>::from_schema(&schema)?;
//! tree.mount(&host, "app")?;
//! assert_eq!(tree.to_html(), "<ul><li id=\"first\">A</li></ul>");
//! # Ok::<(), trellis_core::Error>(())
//! ```

extern crate alloc;

mod attributes;
pub mod bridge;
mod error;
mod graft;
mod host;
mod listeners;
mod markup;
mod memory;
mod node;
mod render;
pub mod schema;
mod tree;
mod walker;

pub use attributes::{AttrKey, Attributes, extract as extract_attributes};
pub use error::{Error, FetchError, HostError, Result};
pub use host::{Host, Listener, ListenerKey};
pub use memory::{MemoryEvent, MemoryHandle, MemoryHost};
pub use node::{Node, NodeId};
pub use schema::{FieldDescriptor, Shape, Template, TemplateSchema};
pub use tree::{Tree, TreeState};
pub use walker::{DuplicateIds, TreeBuilder};
