//! Event publisher (C8): enqueues envelopes to a topic with retry and a
//! bounded in-memory fallback buffer.
//!
//! No global ordering is guaranteed across topics; within a topic the
//! broker's own ordering is trusted but not relied upon by consumers.

pub mod broker;

pub use broker::{Broker, BrokerError};

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use taskwire_core::{Clock, EventEnvelope, EventPayload};
use taskwire_retry::RetryStrategy;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("publish buffer is full (max_buffer_size={0})")]
    BufferFull(usize),
}

#[derive(Debug, Clone)]
struct BufferedEvent {
    topic: String,
    envelope: EventEnvelope,
    retry_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub published: usize,
    pub failed: usize,
}

pub struct EventPublisher {
    broker: Arc<dyn Broker>,
    clock: Arc<dyn Clock>,
    retry_strategy: RetryStrategy,
    /// Total attempts = `max_retries + 1` (the initial attempt plus retries).
    max_retries: u32,
    enable_buffer: bool,
    max_buffer_size: usize,
    buffer: Mutex<VecDeque<BufferedEvent>>,
}

impl EventPublisher {
    #[must_use]
    pub fn new(broker: Arc<dyn Broker>, clock: Arc<dyn Clock>) -> Self {
        Self {
            broker,
            clock,
            retry_strategy: RetryStrategy::Exponential {
                base_ms: 1_000,
                max_ms: 300_000,
                multiplier: 2.0,
                jitter: false,
            },
            max_retries: 3,
            enable_buffer: false,
            max_buffer_size: 1_000,
            buffer: Mutex::new(VecDeque::new()),
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_buffer(mut self, enable: bool, max_buffer_size: usize) -> Self {
        self.enable_buffer = enable;
        self.max_buffer_size = max_buffer_size;
        self
    }

    /// Publish `payload` to `topic`. Mints a UUID v4 event id if none is
    /// given. Retries broker publish with exponential backoff
    /// (`2^attempt` seconds) up to `max_retries + 1` total tries; if every
    /// attempt fails and buffering is enabled, the event is enqueued
    /// instead of returning an error.
    pub async fn publish(
        &self,
        topic: &str,
        payload: EventPayload,
        event_id: Option<String>,
    ) -> Result<String, PublishError> {
        let event_id = event_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let envelope = EventEnvelope::new(event_id.clone(), self.clock.now(), payload);

        let total_attempts = self.max_retries + 1;
        let mut last_err = None;
        for attempt in 1..=total_attempts {
            match self.broker.publish(topic, &envelope).await {
                Ok(()) => {
                    info!(event_id = %envelope.event_id, %topic, attempt, "event published");
                    return Ok(event_id);
                }
                Err(err) => {
                    warn!(event_id = %envelope.event_id, %topic, attempt, total_attempts, %err, "publish attempt failed");
                    last_err = Some(err);
                    if attempt < total_attempts {
                        tokio::time::sleep(self.retry_strategy.delay_for(attempt)).await;
                    }
                }
            }
        }

        if self.enable_buffer {
            self.buffer_event(topic, envelope)?;
            return Ok(event_id);
        }

        Err(PublishError::Broker(last_err.expect(
            "loop always runs at least once and records an error on every failure",
        )))
    }

    fn buffer_event(&self, topic: &str, envelope: EventEnvelope) -> Result<(), PublishError> {
        let mut buffer = self.buffer.lock().unwrap();
        if buffer.len() >= self.max_buffer_size {
            return Err(PublishError::BufferFull(self.max_buffer_size));
        }
        buffer.push_back(BufferedEvent {
            topic: topic.to_owned(),
            envelope,
            retry_count: 0,
        });
        Ok(())
    }

    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    /// Replays buffered events against the broker. Events that succeed are
    /// removed; events that fail again stay buffered with an incremented
    /// retry counter.
    pub async fn flush(&self) -> FlushSummary {
        let drained: Vec<BufferedEvent> = {
            let mut buffer = self.buffer.lock().unwrap();
            buffer.drain(..).collect()
        };

        let mut summary = FlushSummary::default();
        let mut remaining = VecDeque::new();
        for mut buffered in drained {
            match self.broker.publish(&buffered.topic, &buffered.envelope).await {
                Ok(()) => summary.published += 1,
                Err(_) => {
                    buffered.retry_count += 1;
                    remaining.push_back(buffered);
                    summary.failed += 1;
                }
            }
        }

        let mut buffer = self.buffer.lock().unwrap();
        remaining.extend(buffer.drain(..));
        *buffer = remaining;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use taskwire_core::{OwnerId, Priority, SystemClock, TaskId};

    struct FlakyBroker {
        fail_times: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FlakyBroker {
        fn new(fail_times: usize) -> Self {
            Self {
                fail_times: AtomicUsize::new(fail_times),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Broker for FlakyBroker {
        async fn publish(&self, _topic: &str, _envelope: &EventEnvelope) -> Result<(), BrokerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_times.load(Ordering::SeqCst) > 0 {
                self.fail_times.fetch_sub(1, Ordering::SeqCst);
                return Err(BrokerError::Unavailable("down".into()));
            }
            Ok(())
        }
    }

    fn payload() -> EventPayload {
        EventPayload::TaskDeleted {
            task_id: TaskId::new("t1"),
            owner_id: OwnerId::new("o1"),
            deleted_at: chrono::Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_then_succeeds() {
        let broker = Arc::new(FlakyBroker::new(2));
        let publisher = EventPublisher::new(broker.clone(), Arc::new(SystemClock));
        let result = publisher.publish("task-events", payload(), None).await;
        assert!(result.is_ok());
        assert_eq!(broker.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_errors_without_buffer() {
        let broker = Arc::new(FlakyBroker::new(10));
        let publisher = EventPublisher::new(broker.clone(), Arc::new(SystemClock));
        let result = publisher.publish("task-events", payload(), None).await;
        assert!(result.is_err());
        assert_eq!(broker.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn buffers_on_exhaustion_when_enabled() {
        let broker = Arc::new(FlakyBroker::new(10));
        let publisher =
            EventPublisher::new(broker, Arc::new(SystemClock)).with_buffer(true, 10);
        let result = publisher.publish("task-events", payload(), None).await;
        assert!(result.is_ok());
        assert_eq!(publisher.buffer_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn buffer_full_errors() {
        let broker = Arc::new(FlakyBroker::new(100));
        let publisher =
            EventPublisher::new(broker, Arc::new(SystemClock)).with_buffer(true, 1);
        publisher.publish("task-events", payload(), None).await.unwrap();
        let second = publisher.publish("task-events", payload(), None).await;
        assert!(matches!(second, Err(PublishError::BufferFull(1))));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_drains_successful_events() {
        let broker = Arc::new(FlakyBroker::new(10));
        let publisher =
            EventPublisher::new(broker.clone(), Arc::new(SystemClock)).with_buffer(true, 10);
        publisher.publish("task-events", payload(), None).await.unwrap();
        assert_eq!(publisher.buffer_len(), 1);

        broker.fail_times.store(0, Ordering::SeqCst);
        let summary = publisher.flush().await;
        assert_eq!(summary, FlushSummary { published: 1, failed: 0 });
        assert_eq!(publisher.buffer_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_event_id_is_preserved() {
        let broker = Arc::new(FlakyBroker::new(0));
        let publisher = EventPublisher::new(broker, Arc::new(SystemClock));
        let id = publisher
            .publish("task-events", payload(), Some("evt-fixed".into()))
            .await
            .unwrap();
        assert_eq!(id, "evt-fixed");
    }
}
