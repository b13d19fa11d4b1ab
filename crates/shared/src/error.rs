use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status reported for failures where no HTTP response was received.
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {message}")]
    Transport { message: String },
    #[error("http error {status}: {status_text}")]
    Http { status: u16, status_text: String },
    #[error("invalid response body: {message}")]
    Decode { message: String },
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Status code shown to the user; failures without a response map to 500.
    pub fn status(&self) -> u16 {
        match self {
            Self::Http { status, .. } => *status,
            Self::Transport { .. } | Self::Decode { .. } | Self::Cancelled => {
                TRANSPORT_FAILURE_STATUS
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn to_failure(&self) -> FailureInfo {
        let status_text = match self {
            Self::Http { status_text, .. } => status_text.clone(),
            Self::Transport { message } | Self::Decode { message } => message.clone(),
            Self::Cancelled => "request cancelled".to_string(),
        };
        FailureInfo {
            status: self.status(),
            status_text,
        }
    }
}

/// The `{status, statusText}` pair carried by a failure signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureInfo {
    pub status: u16,
    pub status_text: String,
}

impl std::fmt::Display for FailureInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status, self.status_text)
    }
}

impl From<FetchError> for FailureInfo {
    fn from(value: FetchError) -> Self {
        value.to_failure()
    }
}
