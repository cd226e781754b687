#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]

extern crate self as trellis;

#[doc(inline)]
pub use trellis_core::*;
#[doc(inline)]
pub use trellis_macros::Template;

/// The browser host, fetch backend and console logging.
#[cfg(feature = "web")]
pub use trellis_web as web;

pub mod prelude {
    //! The types needed to declare, build and mount templates.
    //!
    //! ```rust
    //! use trellis::prelude::*;
    //!
    //! #[derive(Template)]
    //! struct Hello {
    //!     #[dom(tag = "p", id = "hello", text = "Hi")]
    //!     me: (),
    //! }
    //!
    //! let tree = Tree::<MemoryHost>::new::<Hello>()?;
    //! assert_eq!(tree.to_html(), "<p id=\"hello\">Hi</p>");
    //! # Ok::<(), trellis::Error>(())
    //! ```
    pub use super::{
        AttrKey, DuplicateIds, Error, FieldDescriptor, Host, MemoryHost, Result, Shape, Template,
        TemplateSchema, Tree, TreeBuilder,
    };
}
