//! Error types for the query pipeline.
//!
//! Only [`QueryError`] ever leaves the orchestrator. [`ProviderError`] and
//! [`CompletionError`] are absorbed by the weather reporter and the response
//! composer, which turn them into degraded answers.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::degrade::FailureKind;

/// Failure while fetching current conditions from the weather service.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("weather service answered with status {0}")]
    Status(StatusCode),

    #[error("weather request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode weather payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("weather payload has no `{0}` field")]
    MissingField(&'static str),
}

impl ProviderError {
    /// The service answered, just not with a usable status.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Status(_))
    }
}

impl FailureKind for ProviderError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::MissingField(_) => "missing_field",
        }
    }
}

/// Failure while asking the language model to rephrase a report.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("language model is rate limited: {0}")]
    RateLimited(String),

    #[error("language model answered with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("language model request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode completion: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("language model returned no text")]
    Empty,

    #[error("language model did not answer within {0:?}")]
    Timeout(Duration),
}

impl CompletionError {
    /// Whether this failure is a rate-limit condition.
    ///
    /// Some gateways wrap a 429 in another status or an error string, so the
    /// message is inspected as well.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Status { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS => true,
            other => {
                let message = other.to_string().to_lowercase();
                message.contains("429")
                    || message.contains("rate limit")
                    || message.contains("rate-limit")
                    || message.contains("ratelimit")
            }
        }
    }
}

impl FailureKind for CompletionError {
    fn kind(&self) -> &'static str {
        if self.is_rate_limit() {
            return "rate_limited";
        }

        match self {
            Self::RateLimited(_) => "rate_limited",
            Self::Status { .. } => "status",
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::Empty => "empty",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Construction-time failure: building clients or compiling patterns.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid city pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Unexpected fault inside the pipeline; surfaces to the caller as a service error.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("internal error: {0}")]
    Internal(String),
}
