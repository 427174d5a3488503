use async_trait::async_trait;
use taskwire_core::EventEnvelope;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

/// The publish side of the message broker. Implementations are expected to
/// be thin wrappers around whatever transport a deployment uses (Kafka,
/// Dapr pub/sub, a cloud queue); this crate only depends on the contract.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish(&self, topic: &str, envelope: &EventEnvelope) -> Result<(), BrokerError>;
}
