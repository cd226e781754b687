//! Straight-line fetches over callback-driven native APIs.
//!
//! Native fetch APIs report each stage (response headers, then body) through
//! a completion callback. [`Rendezvous`] turns those callbacks into values a
//! single task can await, so a two-stage fetch reads as two sequential
//! awaits on the same channel.

use alloc::boxed::Box;

use async_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::error::FetchError;

/// A single-slot channel with one waiting task on one side and native
/// completion callbacks on the other.
#[derive(Debug)]
pub struct Rendezvous<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> Default for Rendezvous<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Rendezvous<T> {
    /// Creates an empty rendezvous.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::bounded(1);
        Self { sender, receiver }
    }

    /// Returns the sending side to hand to a completion callback.
    #[must_use]
    pub fn deliverer(&self) -> Deliver<T> {
        Deliver {
            sender: self.sender.clone(),
        }
    }

    /// Suspends until a callback delivers a value.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Interrupted`] if the channel closes without a value.
    pub async fn wait(&self) -> Result<T, FetchError> {
        self.receiver.recv().await.map_err(|_| FetchError::Interrupted)
    }
}

/// The callback side of a [`Rendezvous`]. Delivering never blocks.
#[derive(Debug)]
pub struct Deliver<T> {
    sender: Sender<T>,
}

impl<T> Clone for Deliver<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> Deliver<T> {
    /// Hands `value` to the waiting task. Returns `false` if the slot is
    /// still occupied or the waiting side is gone.
    pub fn deliver(&self, value: T) -> bool {
        match self.sender.try_send(value) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("rendezvous slot already holds an undelivered value");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Completion callback for one fetch stage.
pub type Completion<T> = Box<dyn FnOnce(Result<T, FetchError>)>;

/// A callback-driven network API.
pub trait FetchBackend {
    /// Native response handle produced by the first stage.
    type Response: 'static;

    /// Starts a request for `url`; `done` fires once with the response.
    fn request(&self, url: &str, done: Completion<Self::Response>);

    /// Starts reading the body of `response`; `done` fires once with the text.
    fn read_text(&self, response: Self::Response, done: Completion<String>);
}

enum Stage<R> {
    Response(Result<R, FetchError>),
    Body(Result<String, FetchError>),
}

/// Fetches `url` and returns its body as text.
///
/// The body is only requested after the response callback has fired.
///
/// # Errors
///
/// Returns the failure reported by either stage, or
/// [`FetchError::Interrupted`] if a stage delivers out of order. A callback
/// that never fires leaves the fetch pending; there is no timeout.
pub async fn fetch_text<B: FetchBackend>(backend: &B, url: &str) -> Result<String, FetchError> {
    let slot = Rendezvous::<Stage<B::Response>>::new();

    let deliver = slot.deliverer();
    backend.request(
        url,
        Box::new(move |response| {
            deliver.deliver(Stage::Response(response));
        }),
    );
    let response = match slot.wait().await? {
        Stage::Response(response) => response?,
        Stage::Body(_) => return Err(FetchError::Interrupted),
    };
    debug!(%url, "response received");

    let deliver = slot.deliverer();
    backend.read_text(
        response,
        Box::new(move |body| {
            deliver.deliver(Stage::Body(body));
        }),
    );
    match slot.wait().await? {
        Stage::Body(body) => body,
        Stage::Response(_) => Err(FetchError::Interrupted),
    }
}

/// Fetches `url` and invokes `on_complete` exactly once with the body or the
/// failure, after both stages have resolved.
pub async fn fetch<B, F>(backend: &B, url: &str, on_complete: F)
where
    B: FetchBackend,
    F: FnOnce(Result<String, FetchError>),
{
    let result = fetch_text(backend, url).await;
    if let Err(error) = &result {
        warn!(%url, %error, "fetch failed");
    }
    on_complete(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;
    use futures::{
        executor::{LocalPool, block_on},
        task::LocalSpawnExt,
    };

    /// Completes every stage synchronously from a fixed table.
    struct Immediate {
        body: Result<String, FetchError>,
        log: RefCell<Vec<String>>,
    }

    impl FetchBackend for Immediate {
        type Response = u16;

        fn request(&self, url: &str, done: Completion<u16>) {
            self.log.borrow_mut().push(format!("request {url}"));
            done(Ok(200));
        }

        fn read_text(&self, response: u16, done: Completion<String>) {
            self.log.borrow_mut().push(format!("read {response}"));
            done(self.body.clone());
        }
    }

    /// Parks every callback until the test fires it.
    #[derive(Default)]
    struct Deferred {
        response: RefCell<Option<Completion<u16>>>,
        body: RefCell<Option<Completion<String>>>,
    }

    impl FetchBackend for Rc<Deferred> {
        type Response = u16;

        fn request(&self, _url: &str, done: Completion<u16>) {
            *self.response.borrow_mut() = Some(done);
        }

        fn read_text(&self, _response: u16, done: Completion<String>) {
            *self.body.borrow_mut() = Some(done);
        }
    }

    #[test]
    fn stages_run_in_order() {
        let backend = Immediate {
            body: Ok("hello".into()),
            log: RefCell::default(),
        };
        assert_eq!(block_on(fetch_text(&backend, "/greeting")), Ok("hello".into()));
        assert_eq!(*backend.log.borrow(), ["request /greeting", "read 200"]);
    }

    #[test]
    fn failures_reach_the_completion_callback() {
        let backend = Immediate {
            body: Err(FetchError::Body("truncated".into())),
            log: RefCell::default(),
        };
        let mut seen = None;
        block_on(fetch(&backend, "/broken", |result| seen = Some(result)));
        assert_eq!(seen, Some(Err(FetchError::Body("truncated".into()))));
    }

    #[test]
    fn body_is_not_requested_before_the_response_arrives() {
        let backend = Rc::new(Deferred::default());
        let result = Rc::new(RefCell::new(None));

        let mut pool = LocalPool::new();
        let task_backend = Rc::clone(&backend);
        let task_result = Rc::clone(&result);
        pool.spawner()
            .spawn_local(async move {
                fetch(&task_backend, "/slow", |body| {
                    *task_result.borrow_mut() = Some(body);
                })
                .await;
            })
            .unwrap();

        pool.run_until_stalled();
        assert!(backend.body.borrow().is_none());
        assert!(result.borrow().is_none());

        let respond = backend.response.borrow_mut().take().unwrap();
        respond(Ok(200));
        pool.run_until_stalled();
        assert!(result.borrow().is_none());

        let finish = backend.body.borrow_mut().take().unwrap();
        finish(Ok("done".into()));
        pool.run_until_stalled();
        assert_eq!(*result.borrow(), Some(Ok("done".to_string())));
    }

    #[test]
    fn dropped_callbacks_leave_the_fetch_pending() {
        struct Silent;

        impl FetchBackend for Silent {
            type Response = ();

            fn request(&self, _url: &str, done: Completion<()>) {
                drop(done);
            }

            fn read_text(&self, _response: (), _done: Completion<String>) {}
        }

        let mut pool = LocalPool::new();
        let result = Rc::new(RefCell::new(None));
        let task_result = Rc::clone(&result);
        pool.spawner()
            .spawn_local(async move {
                *task_result.borrow_mut() = Some(fetch_text(&Silent, "/void").await);
            })
            .unwrap();
        pool.run_until_stalled();
        assert!(result.borrow().is_none());
    }
}
