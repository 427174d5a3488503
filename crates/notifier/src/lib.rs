//! Notification dispatcher (C12): consumes `reminder.due.v1`, sends over
//! every requested channel with per-channel retry, and records the outcome.

use std::sync::Arc;
use std::time::Duration;

use taskwire_channel::{ChannelRegistry, RenderedMessage};
use taskwire_core::{
    Clock, EventEnvelope, EventPayload, NotificationChannel, NotificationDeliveryRecord,
    NotificationId,
};
use taskwire_ledger::{ClaimOutcome, IdempotencyLedger, DEFAULT_TTL_HOURS};
use taskwire_publisher::EventPublisher;
use taskwire_retry::RetryStrategy;
use taskwire_store::DeliveryStore;
use tracing::{info, warn};

/// The consumer name this service claims idempotency under (C4).
pub const CONSUMER: &str = "notification-service";
pub const TASK_EVENTS_TOPIC: &str = "task-events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationDispatcher {
    channels: Arc<ChannelRegistry>,
    ledger: Arc<IdempotencyLedger>,
    publisher: Arc<EventPublisher>,
    deliveries: Arc<dyn DeliveryStore>,
    clock: Arc<dyn Clock>,
    max_retry_attempts: u32,
    retry_strategy: RetryStrategy,
    ttl_hours: i64,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(
        channels: Arc<ChannelRegistry>,
        ledger: Arc<IdempotencyLedger>,
        publisher: Arc<EventPublisher>,
        deliveries: Arc<dyn DeliveryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            channels,
            ledger,
            publisher,
            deliveries,
            clock,
            max_retry_attempts: 3,
            retry_strategy: RetryStrategy::Exponential {
                base_ms: 2_000,
                max_ms: 300_000,
                multiplier: 2.0,
                jitter: false,
            },
            ttl_hours: DEFAULT_TTL_HOURS,
        }
    }

    #[must_use]
    pub fn with_ttl_hours(mut self, ttl_hours: i64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }

    #[must_use]
    pub fn with_max_retry_attempts(mut self, max_retry_attempts: u32) -> Self {
        self.max_retry_attempts = max_retry_attempts;
        self
    }

    #[must_use]
    pub fn with_retry_backoff(mut self, base: u64, max_backoff_secs: u64) -> Self {
        self.retry_strategy = RetryStrategy::Exponential {
            base_ms: base * 1_000,
            max_ms: max_backoff_secs * 1_000,
            multiplier: base as f64,
            jitter: false,
        };
        self
    }

    /// Handles one `reminder.due.v1` envelope. A duplicate claim is a
    /// no-op. Every requested channel is attempted independently: one
    /// channel exhausting retries does not stop the others, and the whole
    /// dispatch is considered resolved (ACK-worthy) once every channel has
    /// produced an outcome event and delivery row.
    pub async fn handle(&self, envelope: &EventEnvelope) -> DispatchSummary {
        let EventPayload::ReminderDue {
            task_id,
            owner_id,
            owner_email,
            task_title,
            task_description,
            due_at,
            channels,
            ..
        } = &envelope.payload
        else {
            return DispatchSummary::default();
        };

        let ttl = Duration::from_secs(u64::try_from(self.ttl_hours).unwrap_or(168) * 3600);
        if self
            .ledger
            .claim(&envelope.event_id, CONSUMER, envelope.event_type(), ttl)
            == ClaimOutcome::Duplicate
        {
            return DispatchSummary::default();
        }

        let message = RenderedMessage {
            subject: format!("Reminder: {task_title}"),
            body: render_body(task_title, task_description.as_deref(), *due_at),
        };

        let mut summary = DispatchSummary::default();
        for channel_kind in channels {
            let outcome = self
                .send_with_retry(*channel_kind, owner_email, &message)
                .await;

            let notification_id = NotificationId::new(uuid::Uuid::new_v4().to_string());
            let now = self.clock.now();
            let (payload, record) = match outcome {
                Ok(()) => {
                    summary.sent += 1;
                    (
                        EventPayload::NotificationSent {
                            notification_id: notification_id.clone(),
                            owner_id: owner_id.clone(),
                            task_id: Some(task_id.clone()),
                            channel: *channel_kind,
                            message: message.body.clone(),
                            sent_at: now,
                        },
                        NotificationDeliveryRecord {
                            id: notification_id,
                            owner_id: owner_id.clone(),
                            task_id: Some(task_id.clone()),
                            channel: *channel_kind,
                            status: taskwire_core::DeliveryStatus::Sent,
                            message: message.body.clone(),
                            error: None,
                            timestamp: now,
                        },
                    )
                }
                Err(err) => {
                    summary.failed += 1;
                    (
                        EventPayload::NotificationFailed {
                            notification_id: notification_id.clone(),
                            owner_id: owner_id.clone(),
                            task_id: Some(task_id.clone()),
                            channel: *channel_kind,
                            message: message.body.clone(),
                            error: err.clone(),
                            failed_at: now,
                        },
                        NotificationDeliveryRecord {
                            id: notification_id,
                            owner_id: owner_id.clone(),
                            task_id: Some(task_id.clone()),
                            channel: *channel_kind,
                            status: taskwire_core::DeliveryStatus::Failed,
                            message: message.body.clone(),
                            error: Some(err),
                            timestamp: now,
                        },
                    )
                }
            };

            self.deliveries.insert(record);
            let _ = self.publisher.publish(TASK_EVENTS_TOPIC, payload, None).await;
        }

        summary
    }

    async fn send_with_retry(
        &self,
        channel_kind: NotificationChannel,
        recipient: &str,
        message: &RenderedMessage,
    ) -> Result<(), String> {
        let name = channel_name(channel_kind);
        let Some(channel) = self.channels.get(name) else {
            return Err(format!("no channel registered for {name}"));
        };

        let mut last_err = String::new();
        for attempt in 1..=self.max_retry_attempts {
            match channel.send(recipient, message).await {
                Ok(_) => {
                    info!(%name, attempt, "notification delivered");
                    return Ok(());
                }
                Err(err) => {
                    last_err = err.to_string();
                    if err.is_retryable() && attempt < self.max_retry_attempts {
                        warn!(%name, attempt, %err, "retryable error, will retry");
                        tokio::time::sleep(self.retry_strategy.delay_for(attempt)).await;
                    } else {
                        warn!(%name, attempt, %err, retryable = err.is_retryable(), "channel send failed");
                        return Err(last_err);
                    }
                }
            }
        }
        Err(last_err)
    }
}

fn channel_name(channel: NotificationChannel) -> &'static str {
    match channel {
        NotificationChannel::Email => "email",
        NotificationChannel::Push => "push",
    }
}

fn render_body(
    title: &str,
    description: Option<&str>,
    due_at: chrono::DateTime<chrono::Utc>,
) -> String {
    match description {
        Some(desc) => format!("\"{title}\" is due at {due_at}.\n\n{desc}"),
        None => format!("\"{title}\" is due at {due_at}."),
    }
}
