use serde::{Deserialize, Serialize};

/// A notification, rendered and ready to hand to a channel for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendStatus {
    Delivered,
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub status: SendStatus,
    pub detail: Option<String>,
}

impl ChannelResponse {
    #[must_use]
    pub fn delivered() -> Self {
        Self {
            status: SendStatus::Delivered,
            detail: None,
        }
    }
}
