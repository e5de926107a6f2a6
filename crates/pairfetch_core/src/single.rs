//! Cold single-value streams.
//!
//! A [`Single`] describes a unit of asynchronous work that ends in exactly one
//! [`FetchOutcome`]. Nothing runs until the stream is run or subscribed, and each
//! run starts the work again from scratch.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use pairfetch_logging::pf_debug;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::task::{spawn_cancellable, TaskHandle};
use crate::{FailureKind, FetchError, FetchOutcome};

/// Completion callback handed to callback-style operations.
pub type Callback<T> = Box<dyn FnOnce(FetchOutcome<T>) + Send + 'static>;

/// Cancellation capability returned when a callback-style operation starts.
///
/// Implementations must tolerate being cancelled more than once.
pub trait Cancellable: Send + 'static {
    fn cancel(&self);
}

type Factory<T> = dyn Fn() -> BoxFuture<'static, FetchOutcome<T>> + Send + Sync;

pub struct Single<T> {
    factory: Arc<Factory<T>>,
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T: Send + 'static> Single<T> {
    /// Builds a stream from a future factory; `factory` runs once per subscription.
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchOutcome<T>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || factory().boxed()),
        }
    }

    /// Adapts a callback-style operation.
    ///
    /// `start` is invoked lazily, on the first poll of each run. If the run is
    /// dropped before the callback fires, the handle returned by `start` is
    /// cancelled and the late callback (if any) goes nowhere.
    pub fn from_callback<F, H>(start: F) -> Self
    where
        F: Fn(Callback<T>) -> H + Send + Sync + 'static,
        H: Cancellable,
    {
        let start = Arc::new(start);
        Self::new(move || {
            let start = Arc::clone(&start);
            async move {
                let (tx, rx) = oneshot::channel();
                let handle = start(Box::new(move |outcome| {
                    let _ = tx.send(outcome);
                }));
                let mut guard = CancelOnDrop(Some(handle));
                let outcome = rx.await.unwrap_or_else(|_| {
                    Err(FetchError::new(
                        FailureKind::Transport,
                        "request dropped before completion",
                    ))
                });
                guard.disarm();
                outcome
            }
        })
    }

    /// Starts a fresh run of the underlying work.
    pub fn run(&self) -> BoxFuture<'static, FetchOutcome<T>> {
        (self.factory)()
    }

    /// Transforms the value; errors pass through untouched.
    pub fn map<U, F>(&self, f: F) -> Single<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        Single::new(move || {
            let f = Arc::clone(&f);
            source.run().map(move |outcome| outcome.map(|value| (*f)(value)))
        })
    }

    /// Runs the stream on `runtime` and reports the terminal outcome to `on_event`.
    ///
    /// `on_event` fires at most once, and never after [`Subscription::cancel`].
    pub fn subscribe_on<F>(&self, runtime: &Handle, on_event: F) -> Subscription
    where
        F: FnOnce(FetchOutcome<T>) + Send + 'static,
    {
        Subscription {
            task: spawn_cancellable(runtime, self.run(), Box::new(on_event)),
        }
    }
}

/// One active subscription. Dropping it detaches the subscriber.
pub struct Subscription {
    task: TaskHandle,
}

impl Subscription {
    /// Stops delivery and releases everything the subscription acquired.
    ///
    /// Every resource the run holds, including requests started by
    /// [`Single::from_callback`] sources, is cancelled before this returns.
    pub fn cancel(&self) {
        if !self.task.is_cancelled() {
            pf_debug!("subscription cancelled");
        }
        self.task.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct CancelOnDrop<H: Cancellable>(Option<H>);

impl<H: Cancellable> CancelOnDrop<H> {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl<H: Cancellable> Drop for CancelOnDrop<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.cancel();
        }
    }
}
