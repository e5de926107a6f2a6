use std::sync::Arc;

use pairfetch_core::{zip, FetchError, FetchOutcome, RetryPolicy, Single, Subscription};
use pairfetch_logging::{pf_info, pf_warn};
use tokio::runtime::Handle;

use crate::{HttpClient, PairFetchSettings, ReqwestTransport, RequestExecutor, Transport};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to set up transport: {0}")]
    Transport(FetchError),
    #[error("invalid endpoint configuration: {0}")]
    Endpoint(FetchError),
}

/// Entry point for UI glue: fetch both resources, retry each, deliver the pair.
pub struct PairFetchHandle {
    client: HttpClient,
    retry: RetryPolicy,
    runtime: Handle,
}

impl PairFetchHandle {
    /// Builds the production reqwest transport; requests run on `runtime`.
    pub fn new(settings: PairFetchSettings, runtime: Handle) -> Result<Self, EngineError> {
        let transport = ReqwestTransport::new(&settings.fetch).map_err(EngineError::Transport)?;
        Self::with_transport(settings, Arc::new(transport), runtime)
    }

    pub fn with_transport(
        settings: PairFetchSettings,
        transport: Arc<dyn Transport>,
        runtime: Handle,
    ) -> Result<Self, EngineError> {
        let executor = RequestExecutor::new(transport, runtime.clone());
        let client = HttpClient::new(executor, &settings).map_err(EngineError::Endpoint)?;
        Ok(Self {
            client,
            retry: settings.retry,
            runtime,
        })
    }

    /// Both resources, each retried per the configured policy, joined into one pair.
    pub fn paired(&self, param: i64) -> Single<(String, String)> {
        let first = self.client.first_resource_single(param).retry(self.retry);
        let second = self.client.second_resource_single().retry(self.retry);
        zip(&first, &second)
    }

    /// Starts the paired fetch; `on_result` fires exactly once unless the
    /// returned subscription is cancelled or dropped first.
    pub fn start_paired_fetch<F>(&self, param: i64, on_result: F) -> Subscription
    where
        F: FnOnce(FetchOutcome<(String, String)>) + Send + 'static,
    {
        pf_info!("starting paired fetch (param={})", param);
        self.paired(param).subscribe_on(&self.runtime, move |outcome| {
            match &outcome {
                Ok((first, second)) => pf_info!(
                    "paired fetch done ({} + {} bytes)",
                    first.len(),
                    second.len()
                ),
                Err(err) => pf_warn!("paired fetch failed: {}", err),
            }
            on_result(outcome);
        })
    }
}
