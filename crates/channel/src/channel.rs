use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::{ChannelResponse, RenderedMessage};

/// Strongly-typed notification channel with native `async fn`.
///
/// Not object-safe (native `async fn` desugars to an opaque `impl Future`).
/// For dynamic dispatch, implement this and rely on the blanket
/// [`DynChannel`] implementation.
pub trait Channel: Send + Sync {
    /// Unique name of this channel, e.g. `"email"` or `"push"`.
    fn name(&self) -> &str;

    /// Deliver `message` to `recipient`.
    fn send(
        &self,
        recipient: &str,
        message: &RenderedMessage,
    ) -> impl std::future::Future<Output = Result<ChannelResponse, ChannelError>> + Send;

    /// Verify the channel is reachable and configured correctly.
    fn health_check(&self) -> impl std::future::Future<Output = Result<(), ChannelError>> + Send;
}

/// Object-safe channel trait for use behind `Arc<dyn DynChannel>`.
///
/// Implement [`Channel`] instead; every `Channel` gets this for free via the
/// blanket implementation below.
#[async_trait]
pub trait DynChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send(
        &self,
        recipient: &str,
        message: &RenderedMessage,
    ) -> Result<ChannelResponse, ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError>;
}

#[async_trait]
impl<T: Channel + Sync> DynChannel for T {
    fn name(&self) -> &str {
        Channel::name(self)
    }

    async fn send(
        &self,
        recipient: &str,
        message: &RenderedMessage,
    ) -> Result<ChannelResponse, ChannelError> {
        Channel::send(self, recipient, message).await
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Channel::health_check(self).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    struct MockChannel {
        channel_name: String,
        should_fail: bool,
    }

    impl MockChannel {
        fn new(name: &str, should_fail: bool) -> Self {
            Self {
                channel_name: name.to_owned(),
                should_fail,
            }
        }
    }

    impl Channel for MockChannel {
        fn name(&self) -> &str {
            &self.channel_name
        }

        async fn send(
            &self,
            _recipient: &str,
            _message: &RenderedMessage,
        ) -> Result<ChannelResponse, ChannelError> {
            if self.should_fail {
                return Err(ChannelError::SendFailed("mock failure".into()));
            }
            Ok(ChannelResponse::delivered())
        }

        async fn health_check(&self) -> Result<(), ChannelError> {
            if self.should_fail {
                return Err(ChannelError::Connection("mock unhealthy".into()));
            }
            Ok(())
        }
    }

    fn message() -> RenderedMessage {
        RenderedMessage {
            subject: "reminder".into(),
            body: "your task is due".into(),
        }
    }

    #[tokio::test]
    async fn channel_send_success() {
        let channel = MockChannel::new("email", false);
        let resp = Channel::send(&channel, "owner@example.com", &message())
            .await
            .unwrap();
        assert_eq!(resp.status, crate::message::SendStatus::Delivered);
    }

    #[tokio::test]
    async fn channel_send_failure() {
        let channel = MockChannel::new("email", true);
        let err = Channel::send(&channel, "owner@example.com", &message())
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::SendFailed(_)));
    }

    #[tokio::test]
    async fn blanket_dyn_channel_impl() {
        let channel: Arc<dyn DynChannel> = Arc::new(MockChannel::new("push", false));
        assert_eq!(channel.name(), "push");
        let resp = channel.send("device-1", &message()).await.unwrap();
        assert_eq!(resp.status, crate::message::SendStatus::Delivered);
        channel.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn dyn_channel_health_check_failure() {
        let channel: Arc<dyn DynChannel> = Arc::new(MockChannel::new("sick", true));
        let err = channel.health_check().await.unwrap_err();
        assert!(matches!(err, ChannelError::Connection(_)));
    }
}
