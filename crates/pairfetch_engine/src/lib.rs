//! Pairfetch engine: transport, request execution and the paired-fetch trigger.
mod client;
mod engine;
mod executor;
mod settings;
mod transport;

pub use client::HttpClient;
pub use engine::{EngineError, PairFetchHandle};
pub use executor::{RequestExecutor, RequestHandle};
pub use settings::{FetchSettings, PairFetchSettings, FIRST_RESOURCE_URL, SECOND_RESOURCE_URL};
pub use transport::{RawResponse, ReqwestTransport, Transport};
