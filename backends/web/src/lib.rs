#![allow(clippy::module_name_repetitions)]

//! Browser backend for `trellis`.
//!
//! [`WebHost`] renders trees into the live document and attaches their
//! listeners as DOM event listeners. [`WebFetch`] drives the two-stage
//! `window.fetch` flow through the core fetch bridge, and [`LogConfig`]
//! routes tracing output and panics to the browser console.
//!
//! ```no_run
//! use trellis_core::{Tree, TemplateSchema};
//! use trellis_web::{LogConfig, WebHost};
//!
//! # fn run(schema: &TemplateSchema) -> Result<(), trellis_core::Error> {
//! LogConfig::new().install();
//! let host = WebHost::new().map_err(trellis_core::HostError::from)?;
//! let mut tree = Tree::<WebHost>::from_schema(schema)?;
//! tree.mount(&host, "app")?;
//! # Ok(())
//! # }
//! ```

mod error;
mod fetch;
mod host;
mod logging;

pub use error::WebError;
pub use fetch::{RequestConfig, WebFetch, fetch, fetch_with};
pub use host::{WebHost, WebListener};
pub use logging::{LogConfig, install_panic_forwarder, install_tracing};
