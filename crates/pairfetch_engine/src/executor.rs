use std::sync::Arc;

use futures_util::future::FutureExt;
use pairfetch_core::{
    interpret_response, spawn_cancellable, Callback, Cancellable, FetchRequest, TaskHandle,
};
use pairfetch_logging::{pf_debug, pf_trace};
use tokio::runtime::Handle;

use crate::Transport;

/// Issues requests through a transport and reports each result through a callback.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    runtime: Handle,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        Self { transport, runtime }
    }

    /// Starts `request` on the runtime and returns immediately.
    ///
    /// `on_complete` is called exactly once with the interpreted outcome, unless
    /// the returned handle is cancelled first, in which case it is never called.
    /// A request task that dies without an outcome reports a transport failure.
    pub fn execute(&self, request: FetchRequest, on_complete: Callback<String>) -> RequestHandle {
        let transport = Arc::clone(&self.transport);
        let work = async move {
            pf_trace!("GET {}", request.endpoint());
            let raw = transport.send(&request).await?;
            interpret_response(&request, raw.status, raw.body.as_deref())
        }
        .boxed();

        RequestHandle {
            task: spawn_cancellable(&self.runtime, work, on_complete),
        }
    }
}

/// Cancellation capability for one in-flight request.
#[derive(Clone)]
pub struct RequestHandle {
    task: TaskHandle,
}

impl RequestHandle {
    /// Drops the in-flight request and its callback before returning.
    pub fn cancel(&self) {
        if !self.task.is_cancelled() {
            pf_debug!("request cancelled");
        }
        self.task.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_cancelled()
    }
}

impl Cancellable for RequestHandle {
    fn cancel(&self) {
        RequestHandle::cancel(self);
    }
}
