use std::ops::Range;
use std::time::Duration;

use pairfetch_core::RetryPolicy;

pub const FIRST_RESOURCE_URL: &str = "http://adamborek.com/single-responsibility-principle-swift/";
pub const SECOND_RESOURCE_URL: &str = "http://adamborek.com/rules-for-better-swift-code/";

/// Transport-level limits applied to every request.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Everything needed to run the paired fetch.
#[derive(Debug, Clone)]
pub struct PairFetchSettings {
    pub fetch: FetchSettings,
    pub first_endpoint: String,
    /// Accepted status codes for the first resource; `None` accepts anything.
    pub first_status: Option<Range<u16>>,
    pub second_endpoint: String,
    pub second_status: Option<Range<u16>>,
    pub retry: RetryPolicy,
}

impl Default for PairFetchSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            first_endpoint: FIRST_RESOURCE_URL.to_string(),
            first_status: Some(200..300),
            second_endpoint: SECOND_RESOURCE_URL.to_string(),
            second_status: None,
            retry: RetryPolicy::default(),
        }
    }
}
