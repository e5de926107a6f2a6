//! Spawned work whose cancellation runs in the caller's stack frame.
//!
//! The in-flight future lives in a slot shared by the spawned task and the
//! [`TaskHandle`]. The task polls it through the slot, and [`TaskHandle::cancel`]
//! takes it out and drops it before returning, so every guard the future owns
//! has run by the time `cancel` returns, whether or not the runtime is still
//! being driven.

use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures_util::future::{poll_fn, BoxFuture, FutureExt};
use pairfetch_logging::pf_debug;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{Callback, FailureKind, FetchError, FetchOutcome};

struct Active<T> {
    work: BoxFuture<'static, FetchOutcome<T>>,
    on_done: Callback<T>,
}

type Slot<T> = Mutex<Option<Active<T>>>;

trait Release: Send + Sync {
    fn release(&self);
}

impl<T: Send + 'static> Release for Slot<T> {
    fn release(&self) {
        let active = self.lock().unwrap_or_else(PoisonError::into_inner).take();
        // Dropped outside the lock so guards may cancel other tasks.
        drop(active);
    }
}

/// Cancellation handle for work started with [`spawn_cancellable`].
#[derive(Clone)]
pub struct TaskHandle {
    token: CancellationToken,
    slot: Arc<dyn Release>,
}

impl TaskHandle {
    /// Drops the in-flight work and its callback before returning.
    ///
    /// Idempotent. Must not be called from inside the work it cancels.
    pub fn cancel(&self) {
        self.token.cancel();
        self.slot.release();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Runs `work` on `runtime` and hands its outcome to `on_done`.
///
/// `on_done` is called at most once, never after [`TaskHandle::cancel`], and
/// never from inside this call. If the task ends without an outcome (the work
/// panicked or the runtime shut down) `on_done` receives a
/// [`FailureKind::Transport`] failure instead.
pub fn spawn_cancellable<T: Send + 'static>(
    runtime: &Handle,
    work: BoxFuture<'static, FetchOutcome<T>>,
    on_done: Callback<T>,
) -> TaskHandle {
    let slot: Arc<Slot<T>> = Arc::new(Mutex::new(Some(Active { work, on_done })));
    let token = CancellationToken::new();

    let task_slot = Arc::clone(&slot);
    let cancelled = token.clone();
    runtime.spawn(async move {
        let _abandoned = DeliverOnAbandon(Arc::clone(&task_slot));
        tokio::select! {
            biased;
            _ = cancelled.cancelled() => {
                pf_debug!("task cancelled before completion");
            }
            finished = poll_fn(|cx| poll_slot(&task_slot, cx)) => {
                if let Some((on_done, outcome)) = finished {
                    on_done(outcome);
                }
            }
        }
    });

    TaskHandle { token, slot }
}

/// `Ready(None)` means the slot was emptied by a cancel.
fn poll_slot<T>(
    slot: &Slot<T>,
    cx: &mut Context<'_>,
) -> Poll<Option<(Callback<T>, FetchOutcome<T>)>> {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    let ready = match guard.as_mut() {
        None => return Poll::Ready(None),
        Some(active) => active.work.poll_unpin(cx),
    };
    match ready {
        Poll::Pending => Poll::Pending,
        Poll::Ready(outcome) => Poll::Ready(guard.take().map(|active| (active.on_done, outcome))),
    }
}

/// Reports a failure if the task is torn down while work is still pending.
struct DeliverOnAbandon<T>(Arc<Slot<T>>);

impl<T> Drop for DeliverOnAbandon<T> {
    fn drop(&mut self) {
        let active = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(Active { work, on_done }) = active {
            drop(work);
            pf_debug!("task ended without an outcome");
            on_done(Err(FetchError::new(
                FailureKind::Transport,
                "task ended before completion",
            )));
        }
    }
}
