use taskwire_channel::{Channel, ChannelError, ChannelResponse, RenderedMessage};

use crate::backend::{EmailBackend, EmailMessage};
use crate::config::EmailConfig;
use crate::smtp::SmtpBackend;

/// Email notification channel backed by a pluggable [`EmailBackend`].
///
/// # Examples
///
/// ```no_run
/// use taskwire_email::{EmailChannel, EmailConfig};
///
/// let config = EmailConfig::new("smtp.example.com", "noreply@example.com")
///     .with_credentials("user", "pass");
/// let channel = EmailChannel::new(&config).unwrap();
/// ```
pub struct EmailChannel {
    from_address: String,
    backend: Box<dyn EmailBackend>,
}

impl std::fmt::Debug for EmailChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailChannel")
            .field("from_address", &self.from_address)
            .field("backend", &self.backend)
            .finish()
    }
}

impl EmailChannel {
    /// Create a new `EmailChannel` backed by SMTP.
    pub fn new(config: &EmailConfig) -> Result<Self, ChannelError> {
        let from_address = config.from_address.clone();
        let backend = SmtpBackend::new(config.smtp_config())?;
        Ok(Self {
            from_address,
            backend: Box::new(backend),
        })
    }

    /// Create an `EmailChannel` with a pre-built backend (for testing).
    pub fn with_backend(from_address: impl Into<String>, backend: Box<dyn EmailBackend>) -> Self {
        Self {
            from_address: from_address.into(),
            backend,
        }
    }
}

impl Channel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(
        &self,
        recipient: &str,
        message: &RenderedMessage,
    ) -> Result<ChannelResponse, ChannelError> {
        let email = EmailMessage {
            from: self.from_address.clone(),
            to: recipient.to_owned(),
            subject: message.subject.clone(),
            body: Some(message.body.clone()),
            html_body: None,
            cc: None,
            bcc: None,
            reply_to: None,
        };

        let result = self.backend.send(&email).await?;
        Ok(ChannelResponse {
            status: taskwire_channel::SendStatus::Delivered,
            detail: result.message_id,
        })
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use lettre::{AsyncSmtpTransport, Tokio1Executor};

    use super::*;
    use crate::smtp::SmtpBackend;

    fn test_config() -> EmailConfig {
        EmailConfig::new("localhost", "sender@example.com").with_tls(false)
    }

    fn channel_with_transport() -> EmailChannel {
        let config = test_config();
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost")
            .port(2525)
            .build();
        let backend = SmtpBackend::with_transport(config.smtp_config(), transport);
        EmailChannel::with_backend(config.from_address, Box::new(backend))
    }

    #[tokio::test]
    async fn channel_name_is_email() {
        let channel = channel_with_transport();
        assert_eq!(Channel::name(&channel), "email");
    }

    #[tokio::test]
    async fn send_rejects_invalid_recipient() {
        let channel = channel_with_transport();
        let message = RenderedMessage {
            subject: "reminder".into(),
            body: "your task is due".into(),
        };
        let result = Channel::send(&channel, "not-an-email", &message).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn debug_impl_does_not_panic() {
        let channel = channel_with_transport();
        let debug_str = format!("{channel:?}");
        assert!(debug_str.contains("EmailChannel"));
        assert!(debug_str.contains("SmtpBackend"));
    }

    #[tokio::test]
    async fn new_builds_smtp_backend() {
        let config = test_config();
        let channel = EmailChannel::new(&config);
        assert!(channel.is_ok());
    }
}
