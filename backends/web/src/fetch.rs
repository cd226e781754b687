use trellis_core::{
    FetchError,
    bridge::{self, Completion, FetchBackend},
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Headers, RequestInit, Response, Window};

use crate::error::{WebError, body_error, network_error};

/// Method, headers and body sent with every request of a [`WebFetch`].
///
/// The default is a plain `GET` without headers or body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    method: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Adds a header; later values for the same name replace earlier ones.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(seen, _)| seen.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Sets a text body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    fn request_init(&self) -> Result<RequestInit, JsValue> {
        let init = RequestInit::new();
        if let Some(method) = &self.method {
            init.set_method(method);
        }
        if !self.headers.is_empty() {
            let headers = Headers::new()?;
            for (name, value) in &self.headers {
                headers.set(name, value)?;
            }
            init.set_headers(&headers);
        }
        if let Some(body) = &self.body {
            init.set_body(&JsValue::from_str(body));
        }
        Ok(init)
    }
}

/// `window.fetch` as a callback-driven [`FetchBackend`].
#[derive(Debug, Clone)]
pub struct WebFetch {
    window: Window,
    config: RequestConfig,
}

impl WebFetch {
    /// Binds to the current window.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::DomUnavailable`] outside of a browser.
    pub fn new() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::DomUnavailable)?;
        Ok(Self {
            window,
            config: RequestConfig::default(),
        })
    }

    /// Sends every request with `config`.
    #[must_use]
    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }
}

impl FetchBackend for WebFetch {
    type Response = Response;

    fn request(&self, url: &str, done: Completion<Response>) {
        let promise = if self.config.is_plain() {
            self.window.fetch_with_str(url)
        } else {
            match self.config.request_init() {
                Ok(init) => self.window.fetch_with_str_and_init(url, &init),
                Err(error) => return done(Err(network_error(error))),
            }
        };
        spawn_local(async move {
            let outcome = JsFuture::from(promise)
                .await
                .map_err(network_error)
                .and_then(|value| {
                    value
                        .dyn_into::<Response>()
                        .map_err(|_| FetchError::Network("fetch did not yield a Response".into()))
                });
            done(outcome);
        });
    }

    fn read_text(&self, response: Response, done: Completion<String>) {
        let promise = match response.text() {
            Ok(promise) => promise,
            Err(error) => return done(Err(body_error(error))),
        };
        spawn_local(async move {
            let outcome = JsFuture::from(promise)
                .await
                .map_err(body_error)
                .and_then(|value| {
                    value
                        .as_string()
                        .ok_or_else(|| FetchError::Body("response body is not text".into()))
                });
            done(outcome);
        });
    }
}

/// Fetches `url` in the background and hands the body, or the failure, to
/// `on_complete` once both stages have resolved.
///
/// # Errors
///
/// Returns [`WebError::DomUnavailable`] outside of a browser; the request is
/// not started in that case.
pub fn fetch(
    url: impl Into<String>,
    on_complete: impl FnOnce(Result<String, FetchError>) + 'static,
) -> Result<(), WebError> {
    fetch_with(url, RequestConfig::default(), on_complete)
}

/// Like [`fetch`], sending the request with `config`.
///
/// # Errors
///
/// Returns [`WebError::DomUnavailable`] outside of a browser.
pub fn fetch_with(
    url: impl Into<String>,
    config: RequestConfig,
    on_complete: impl FnOnce(Result<String, FetchError>) + 'static,
) -> Result<(), WebError> {
    let backend = WebFetch::new()?.with_config(config);
    let url = url.into();
    spawn_local(async move {
        bridge::fetch(&backend, &url, on_complete).await;
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_a_plain_get() {
        assert!(RequestConfig::new().is_plain());
        assert!(!RequestConfig::new().method("POST").is_plain());
    }

    #[test]
    fn headers_keep_order_and_replace_by_name() {
        let config = RequestConfig::new()
            .header("Accept", "text/plain")
            .header("X-Trace", "1")
            .header("accept", "text/html")
            .body("{}");
        assert_eq!(
            config.headers(),
            [
                ("Accept".to_string(), "text/html".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ]
        );
        assert!(!config.is_plain());
    }
}
