use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::{BoxFuture, FutureExt};
use pairfetch_logging::pf_debug;

use crate::{FetchError, FetchOutcome, Single};

/// Runs `first` and `second` concurrently and pairs their values.
///
/// Both sides are started on the first poll. The pair is emitted once both have
/// a value. The first error wins and the other side is dropped mid-flight, which
/// cancels whatever it was doing.
pub fn zip<A, B>(first: &Single<A>, second: &Single<B>) -> Single<(A, B)>
where
    A: Send + 'static,
    B: Send + 'static,
{
    let first = first.clone();
    let second = second.clone();
    Single::new(move || {
        let pair = PairState {
            first: Side::Pending(first.run()),
            second: Side::Pending(second.run()),
        };
        async move {
            let outcome = pair.await;
            match &outcome {
                Ok(_) => pf_debug!("zip: both sides completed"),
                Err(err) => pf_debug!("zip: short-circuited on {}", err),
            }
            outcome
        }
    })
}

impl<A: Send + 'static> Single<A> {
    pub fn zip<B: Send + 'static>(&self, other: &Single<B>) -> Single<(A, B)> {
        zip(self, other)
    }
}

enum Side<T> {
    Pending(BoxFuture<'static, FetchOutcome<T>>),
    Ready(T),
    Taken,
}

impl<T> Side<T> {
    fn poll_side(&mut self, cx: &mut Context<'_>) -> Result<(), FetchError> {
        if let Side::Pending(work) = self {
            if let Poll::Ready(outcome) = work.poll_unpin(cx) {
                *self = Side::Ready(outcome?);
            }
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        matches!(self, Side::Ready(_))
    }

    fn take(&mut self) -> Option<T> {
        match mem::replace(self, Side::Taken) {
            Side::Ready(value) => Some(value),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// At most one buffered value per side. Dropping it drops whichever side is
/// still in flight.
struct PairState<A, B> {
    first: Side<A>,
    second: Side<B>,
}

// Buffered values are moved out, never pinned.
impl<A, B> Unpin for PairState<A, B> {}

impl<A, B> Future for PairState<A, B> {
    type Output = FetchOutcome<(A, B)>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let first = this.first.poll_side(cx);
        let second = this.second.poll_side(cx);
        if let Err(err) = first.and(second) {
            this.first = Side::Taken;
            this.second = Side::Taken;
            return Poll::Ready(Err(err));
        }

        if this.first.is_ready() && this.second.is_ready() {
            if let (Some(a), Some(b)) = (this.first.take(), this.second.take()) {
                return Poll::Ready(Ok((a, b)));
            }
        }
        Poll::Pending
    }
}
