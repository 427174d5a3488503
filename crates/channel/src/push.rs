//! Push channel: delivers a rendered message by posting it to a device's
//! resolved HTTP endpoint. Device-token resolution happens upstream; this
//! channel only knows how to POST to a URL it is handed.

use reqwest::Client;

use crate::channel::Channel;
use crate::error::ChannelError;
use crate::message::{ChannelResponse, RenderedMessage};

pub struct PushChannel {
    client: Client,
}

impl PushChannel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for PushChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for PushChannel {
    fn name(&self) -> &str {
        "push"
    }

    async fn send(
        &self,
        recipient: &str,
        message: &RenderedMessage,
    ) -> Result<ChannelResponse, ChannelError> {
        let body = serde_json::json!({
            "subject": message.subject,
            "body": message.body,
        });

        let response = self
            .client
            .post(recipient)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChannelError::Timeout(std::time::Duration::from_secs(0))
                } else if e.is_connect() {
                    ChannelError::Connection(e.to_string())
                } else {
                    ChannelError::SendFailed(e.to_string())
                }
            })?;

        if response.status().is_success() {
            Ok(ChannelResponse::delivered())
        } else {
            Err(ChannelError::SendFailed(format!(
                "push endpoint returned {}",
                response.status()
            )))
        }
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
