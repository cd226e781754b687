use thiserror::Error;
use trellis_core::{FetchError, HostError};
use wasm_bindgen::JsValue;

/// Error type produced by the web backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebError {
    /// The DOM APIs are not accessible (e.g., when executed outside of a browser).
    #[error("DOM is not available")]
    DomUnavailable,
    /// No element with the given id exists in the document.
    #[error("failed to find DOM element with id `{0}`")]
    ElementNotFound(String),
    /// Wrapper around JavaScript exceptions.
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        value
            .as_string()
            .map_or_else(|| Self::Js(format!("{value:?}")), Self::Js)
    }
}

impl From<WebError> for JsValue {
    fn from(value: WebError) -> Self {
        Self::from(value.to_string())
    }
}

impl From<WebError> for HostError {
    fn from(value: WebError) -> Self {
        match value {
            WebError::DomUnavailable => Self::Unavailable,
            WebError::ElementNotFound(id) => Self::ElementNotFound(id),
            WebError::Js(message) => Self::Native(message),
        }
    }
}

pub(crate) fn host_error(value: JsValue) -> HostError {
    WebError::from(value).into()
}

pub(crate) fn network_error(value: JsValue) -> FetchError {
    FetchError::Network(WebError::from(value).to_string())
}

pub(crate) fn body_error(value: JsValue) -> FetchError {
    FetchError::Body(WebError::from(value).to_string())
}
