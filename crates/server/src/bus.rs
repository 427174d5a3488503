//! In-process pub/sub broker.
//!
//! This deployment has no external message broker; `task-events` envelopes
//! are handed directly to every registered consumer on publish, matching
//! the explicit-registry pattern the event-driven design favors over
//! reflection-based subscriber discovery.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use taskwire_core::EventEnvelope;
use taskwire_publisher::{Broker, BrokerError};
use tracing::warn;

/// A consumer attached to the in-process bus. Errors are logged, never
/// propagated to the publisher: an unhandled transient error leaves the
/// corresponding idempotency claim unclaimed or failed, so the event is
/// effectively retried on the next publish of the same `event_id`.
#[async_trait]
pub trait Consumer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, envelope: &EventEnvelope);
}

pub struct InProcessBroker {
    consumers: Mutex<Vec<Arc<dyn Consumer>>>,
}

impl InProcessBroker {
    #[must_use]
    pub fn new(consumers: Vec<Arc<dyn Consumer>>) -> Self {
        Self {
            consumers: Mutex::new(consumers),
        }
    }

    /// Attach a consumer after construction. Used at startup, where the
    /// broker must exist before the publisher-dependent services that
    /// become its consumers can be built.
    pub fn register(&self, consumer: Arc<dyn Consumer>) {
        self.consumers.lock().unwrap().push(consumer);
    }
}

#[async_trait]
impl Broker for InProcessBroker {
    async fn publish(&self, _topic: &str, envelope: &EventEnvelope) -> Result<(), BrokerError> {
        let consumers = self.consumers.lock().unwrap().clone();
        for consumer in &consumers {
            consumer.handle(envelope).await;
        }
        Ok(())
    }
}

pub struct RecurrenceEngineConsumer(pub Arc<taskwire_recurrence_engine::RecurrenceEngine>);

#[async_trait]
impl Consumer for RecurrenceEngineConsumer {
    fn name(&self) -> &'static str {
        taskwire_recurrence_engine::CONSUMER
    }

    async fn handle(&self, envelope: &EventEnvelope) {
        if let Err(err) = self.0.handle(envelope).await {
            warn!(consumer = self.name(), %err, "recurrence engine failed to process event");
        }
    }
}

pub struct NotifierConsumer(pub Arc<taskwire_notifier::NotificationDispatcher>);

#[async_trait]
impl Consumer for NotifierConsumer {
    fn name(&self) -> &'static str {
        taskwire_notifier::CONSUMER
    }

    async fn handle(&self, envelope: &EventEnvelope) {
        let summary = self.0.handle(envelope).await;
        if summary.failed > 0 {
            warn!(consumer = self.name(), failed = summary.failed, sent = summary.sent, "some notification channels exhausted retries");
        }
    }
}
