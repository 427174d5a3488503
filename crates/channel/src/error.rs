use std::time::Duration;

use thiserror::Error;

/// Errors raised while sending a notification over a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel not found: {0}")]
    NotFound(String),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("rate limited")]
    RateLimited,
}

impl ChannelError {
    /// Whether the send may succeed if retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited
        )
    }
}
