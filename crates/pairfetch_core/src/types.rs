use std::fmt;

/// Terminal value of one fetch attempt: the payload or the reason it failed.
pub type FetchOutcome<T = String> = Result<T, FetchError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    InvalidStatus(u16),
    Decoding,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Transport,
}

impl FailureKind {
    /// Failures raised by the transport rather than by response interpretation.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FailureKind::Timeout | FailureKind::TooLarge { .. } | FailureKind::Transport
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::InvalidStatus(code) => write!(f, "invalid status {code}"),
            FailureKind::Decoding => write!(f, "decoding error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Transport => write!(f, "transport error"),
        }
    }
}
