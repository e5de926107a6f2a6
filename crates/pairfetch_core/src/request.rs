use std::ops::Range;

use url::Url;

use crate::{FailureKind, FetchError};

/// A single outbound GET: where to go and which status codes count as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    endpoint: Url,
    accepted_status: Option<Range<u16>>,
}

impl FetchRequest {
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            return Err(FetchError::new(
                FailureKind::InvalidRequest,
                "endpoint must not be empty",
            ));
        }
        let endpoint = Url::parse(trimmed)
            .map_err(|err| FetchError::new(FailureKind::InvalidRequest, err.to_string()))?;
        Ok(Self {
            endpoint,
            accepted_status: None,
        })
    }

    /// Restricts success to status codes in the half-open `range`.
    pub fn with_accepted_status(mut self, range: Range<u16>) -> Self {
        self.accepted_status = Some(range);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn accepted_status(&self) -> Option<&Range<u16>> {
        self.accepted_status.as_ref()
    }

    /// Without a configured range every status is accepted.
    pub fn accepts(&self, status: u16) -> bool {
        self.accepted_status
            .as_ref()
            .map_or(true, |range| range.contains(&status))
    }
}
