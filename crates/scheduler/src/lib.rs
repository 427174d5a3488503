//! Reminder scheduler (C10): a periodic tick that scans reminders, fires
//! the ones due, and hands them to the bus as `reminder.due.v1`.
//!
//! Owner identity doubles as the delivery address: `owner_id` is treated as
//! the recipient's email/endpoint, since there is no separate directory of
//! tenant contact info in this system.

use std::sync::Arc;

use taskwire_core::{Clock, EventPayload};
use taskwire_publisher::EventPublisher;
use taskwire_store::{ReminderStore, TaskStore};
use tracing::{debug, warn};

pub const TASK_EVENTS_TOPIC: &str = "task-events";

/// Summary of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    /// Reminders that were due this tick.
    pub found: usize,
    /// Reminders successfully published and marked sent.
    pub sent: usize,
}

pub struct ReminderScheduler {
    tasks: Arc<dyn TaskStore>,
    reminders: Arc<dyn ReminderStore>,
    publisher: Arc<EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ReminderScheduler {
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        reminders: Arc<dyn ReminderStore>,
        publisher: Arc<EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            reminders,
            publisher,
            clock,
        }
    }

    /// Scans every unsent reminder, publishes `reminder.due.v1` for the ones
    /// due now, and marks each one sent once its publish attempt resolves.
    /// A publish failure (buffering disabled at the publisher) leaves the
    /// reminder unsent so the next tick retries it; each reminder commits
    /// independently, so one failure never blocks the rest of the batch.
    pub async fn tick(&self) -> TickSummary {
        let now = self.clock.now();
        let mut summary = TickSummary::default();

        for reminder in self.reminders.list_unsent() {
            let Some(task) = self.tasks.get_any(&reminder.task_id) else {
                continue;
            };
            if task.completed {
                continue;
            }
            let Some(due_at) = task.due_at else {
                continue;
            };
            if !reminder.is_due(due_at, now) {
                continue;
            }

            summary.found += 1;

            let payload = EventPayload::ReminderDue {
                reminder_id: reminder.id.clone(),
                task_id: task.id.clone(),
                owner_id: reminder.owner_id.clone(),
                owner_email: reminder.owner_id.to_string(),
                task_title: task.title.clone(),
                task_description: task.description.clone(),
                due_at,
                remind_before: reminder.offset,
                channels: reminder.channels.clone(),
            };

            match self.publisher.publish(TASK_EVENTS_TOPIC, payload, None).await {
                Ok(_) => match self.reminders.mark_sent(&reminder.id, now) {
                    Ok(()) => summary.sent += 1,
                    Err(err) => warn!(reminder_id = %reminder.id, %err, "mark_sent failed after publish"),
                },
                Err(err) => {
                    debug!(reminder_id = %reminder.id, %err, "reminder publish failed, will retry next tick");
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use taskwire_core::{
        EventEnvelope, FireOffset, FixedClock, NotificationChannel, OwnerId, Priority, Reminder,
        ReminderId, Task, TaskId,
    };
    use taskwire_publisher::{Broker, BrokerError};
    use taskwire_store::{InMemoryReminderStore, InMemoryTaskStore};

    struct CountingBroker {
        publishes: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Broker for CountingBroker {
        async fn publish(&self, _topic: &str, _envelope: &EventEnvelope) -> Result<(), BrokerError> {
            self.publishes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn task(id: &str, owner: &str, due_at: chrono::DateTime<chrono::Utc>, completed: bool) -> Task {
        let now = chrono::Utc::now();
        Task {
            id: TaskId::new(id),
            owner_id: OwnerId::new(owner),
            title: "write report".into(),
            description: None,
            priority: Priority::Medium,
            tags: vec![],
            due_at: Some(due_at),
            completed,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn reminder(id: &str, task_id: &str, owner: &str, offset: &str) -> Reminder {
        Reminder {
            id: ReminderId::new(id),
            task_id: TaskId::new(task_id),
            owner_id: OwnerId::new(owner),
            offset: FireOffset::parse(offset).unwrap(),
            channels: vec![NotificationChannel::Email],
            sent_at: None,
        }
    }

    #[tokio::test]
    async fn tick_fires_due_reminder_and_marks_sent() {
        let now = chrono::Utc::now();
        let tasks = Arc::new(InMemoryTaskStore::new());
        tasks.insert(task("t1", "alice", now + chrono::Duration::minutes(30), false));
        let reminders = Arc::new(InMemoryReminderStore::new());
        reminders.insert(reminder("r1", "t1", "alice", "PT1H"));

        let clock = Arc::new(FixedClock::new(now));
        let broker = Arc::new(CountingBroker { publishes: AtomicUsize::new(0) });
        let publisher = Arc::new(EventPublisher::new(broker.clone(), clock.clone()));
        let scheduler = ReminderScheduler::new(tasks, reminders.clone(), publisher, clock);

        let summary = scheduler.tick().await;
        assert_eq!(summary, TickSummary { found: 1, sent: 1 });
        assert_eq!(broker.publishes.load(Ordering::SeqCst), 1);
        assert!(reminders.list_unsent().is_empty());
    }

    #[tokio::test]
    async fn tick_skips_reminder_not_yet_due() {
        let now = chrono::Utc::now();
        let tasks = Arc::new(InMemoryTaskStore::new());
        tasks.insert(task("t1", "alice", now + chrono::Duration::hours(5), false));
        let reminders = Arc::new(InMemoryReminderStore::new());
        reminders.insert(reminder("r1", "t1", "alice", "PT1H"));

        let clock = Arc::new(FixedClock::new(now));
        let broker = Arc::new(CountingBroker { publishes: AtomicUsize::new(0) });
        let publisher = Arc::new(EventPublisher::new(broker, clock.clone()));
        let scheduler = ReminderScheduler::new(tasks, reminders, publisher, clock);

        let summary = scheduler.tick().await;
        assert_eq!(summary, TickSummary { found: 0, sent: 0 });
    }

    #[tokio::test]
    async fn tick_skips_completed_task() {
        let now = chrono::Utc::now();
        let tasks = Arc::new(InMemoryTaskStore::new());
        tasks.insert(task("t1", "alice", now - chrono::Duration::minutes(5), true));
        let reminders = Arc::new(InMemoryReminderStore::new());
        reminders.insert(reminder("r1", "t1", "alice", "PT1H"));

        let clock = Arc::new(FixedClock::new(now));
        let broker = Arc::new(CountingBroker { publishes: AtomicUsize::new(0) });
        let publisher = Arc::new(EventPublisher::new(broker, clock.clone()));
        let scheduler = ReminderScheduler::new(tasks, reminders, publisher, clock);

        let summary = scheduler.tick().await;
        assert_eq!(summary, TickSummary { found: 0, sent: 0 });
    }

    #[tokio::test]
    async fn tick_does_not_resend_already_sent_reminder() {
        let now = chrono::Utc::now();
        let tasks = Arc::new(InMemoryTaskStore::new());
        tasks.insert(task("t1", "alice", now + chrono::Duration::minutes(30), false));
        let reminders = Arc::new(InMemoryReminderStore::new());
        reminders.insert(reminder("r1", "t1", "alice", "PT1H"));
        reminders.mark_sent(&ReminderId::new("r1"), now).unwrap();

        let clock = Arc::new(FixedClock::new(now));
        let broker = Arc::new(CountingBroker { publishes: AtomicUsize::new(0) });
        let publisher = Arc::new(EventPublisher::new(broker, clock.clone()));
        let scheduler = ReminderScheduler::new(tasks, reminders, publisher, clock);

        let summary = scheduler.tick().await;
        assert_eq!(summary, TickSummary { found: 0, sent: 0 });
    }
}
