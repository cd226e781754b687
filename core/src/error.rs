//! Error types shared by the tree engine, its hosts and the fetch bridge.

use thiserror::Error;

/// Result alias used throughout `trellis-core`.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors produced while building, mutating or rendering a [`Tree`](crate::Tree).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The template has no `me` field describing its root element.
    #[error("template `{0}` has no `me` field describing its root element")]
    MissingRootDescriptor(String),
    /// An operation addressed an element id that was never indexed.
    #[error("no element with id `{0}` is indexed by this tree")]
    UnknownElementId(String),
    /// Two nodes resolved to the same id while duplicates were rejected.
    #[error("element id `{0}` is declared more than once")]
    DuplicateId(String),
    /// The `id` attribute of an indexed node cannot be rewritten.
    #[error("the id of element `{0}` cannot be changed after construction")]
    ImmutableId(String),
    /// A foreign child without a root id cannot be grafted.
    #[error("foreign child `<{0}>` has no root id and cannot be grafted")]
    AnonymousChild(String),
    /// The tree has not been mounted into a host anchor yet.
    #[error("tree has not been mounted into a host element")]
    NotMounted,
    /// A template schema could not be parsed.
    #[error("invalid template schema: {0}")]
    Schema(#[from] serde_json::Error),
    /// The host page rejected an operation.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Errors reported by a [`Host`](crate::Host) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HostError {
    /// The host page is not reachable (e.g. outside of a browser).
    #[error("host document is not available")]
    Unavailable,
    /// No element with the given id exists in the host page.
    #[error("host page has no element with id `{0}`")]
    ElementNotFound(String),
    /// The element exists but is not a form control.
    #[error("element `{0}` has no value")]
    NotAFormControl(String),
    /// The host raised an exception.
    #[error("host error: {0}")]
    Native(String),
}

/// Failures surfaced by the fetch bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The request could not be completed.
    #[error("request failed: {0}")]
    Network(String),
    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
    /// A stage delivered out of order, or the channel closed before it did.
    #[error("fetch was interrupted before completing")]
    Interrupted,
}
