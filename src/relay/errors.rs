use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::relay::timeout::TimedOut;

/// Failure of a single relay attempt. These never leave the relay chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("attempt timed out")]
    TimedOut,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("relay answered with status {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("markup too short ({length} chars)")]
    InsufficientMarkup { length: usize },
}

impl RelayError {
    /// Short label used in logs and attempt summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimedOut => "timeout",
            Self::Transport(_) => "transport",
            Self::BadStatus(_) => "bad_status",
            Self::BodyTooLarge(_) => "body_too_large",
            Self::Decode(_) => "decode",
            Self::InsufficientMarkup { .. } => "insufficient_markup",
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimedOut
        } else if err.is_redirect() {
            Self::Transport("too many redirects".to_string())
        } else if let Some(status) = err.status() {
            Self::BadStatus(status)
        } else if err.is_decode() || err.is_body() {
            Self::Decode(err.to_string())
        } else {
            // DNS, connection refused, TLS
            Self::Transport(err.to_string())
        }
    }
}

impl From<TimedOut> for RelayError {
    fn from(_: TimedOut) -> Self {
        Self::TimedOut
    }
}

/// A relay attempt that did not produce usable markup.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    pub provider: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub error: RelayError,
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("all relay providers exhausted ({} attempts failed)", .attempts.len())]
    AllProvidersExhausted { attempts: Vec<AttemptFailure> },
}

impl RetrievalError {
    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            Self::AllProvidersExhausted { attempts } => attempts,
        }
    }
}
