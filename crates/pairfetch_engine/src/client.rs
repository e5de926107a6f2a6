use pairfetch_core::{Callback, FetchError, FetchRequest, Single};
use pairfetch_logging::pf_debug;

use crate::{PairFetchSettings, RequestExecutor, RequestHandle};

/// The two resources the paired fetch combines.
#[derive(Clone)]
pub struct HttpClient {
    executor: RequestExecutor,
    first: FetchRequest,
    second: FetchRequest,
}

impl HttpClient {
    /// Validates both endpoints up front so issuing a request can never fail synchronously.
    pub fn new(
        executor: RequestExecutor,
        settings: &PairFetchSettings,
    ) -> Result<Self, FetchError> {
        let mut first = FetchRequest::new(&settings.first_endpoint)?;
        if let Some(range) = settings.first_status.clone() {
            first = first.with_accepted_status(range);
        }
        let mut second = FetchRequest::new(&settings.second_endpoint)?;
        if let Some(range) = settings.second_status.clone() {
            second = second.with_accepted_status(range);
        }
        Ok(Self {
            executor,
            first,
            second,
        })
    }

    /// `parameter` does not shape the request; it is only recorded.
    pub fn first_resource(&self, parameter: i64, callback: Callback<String>) -> RequestHandle {
        pf_debug!("first resource requested (parameter={})", parameter);
        self.executor.execute(self.first.clone(), callback)
    }

    pub fn second_resource(&self, callback: Callback<String>) -> RequestHandle {
        pf_debug!("second resource requested");
        self.executor.execute(self.second.clone(), callback)
    }

    pub fn first_resource_single(&self, parameter: i64) -> Single<String> {
        let client = self.clone();
        Single::from_callback(move |callback: Callback<String>| {
            client.first_resource(parameter, callback)
        })
    }

    pub fn second_resource_single(&self) -> Single<String> {
        let client = self.clone();
        Single::from_callback(move |callback: Callback<String>| {
            client.second_resource(callback)
        })
    }
}
