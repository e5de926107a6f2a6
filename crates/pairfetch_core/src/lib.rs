//! Pairfetch core: fetch outcomes and the single-value stream combinators.
mod decode;
mod request;
mod retry;
mod single;
mod task;
mod types;
mod zip;

pub use decode::{decode_text, interpret_response};
pub use request::FetchRequest;
pub use retry::RetryPolicy;
pub use single::{Callback, Cancellable, Single, Subscription};
pub use task::{spawn_cancellable, TaskHandle};
pub use types::{FailureKind, FetchError, FetchOutcome};
pub use zip::zip;
