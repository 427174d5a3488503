//! Domain model entities (spec §3): tasks, recurrence configuration,
//! reminders, and notification delivery records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::FireOffset;
use crate::recurrence::RecurrencePattern;
use crate::types::{NotificationId, OwnerId, ReminderId, RecurrenceId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A task owned by a single tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recurrence descriptor attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceConfig {
    pub id: RecurrenceId,
    pub task_id: TaskId,
    pub owner_id: OwnerId,
    pub pattern: RecurrencePattern,
    pub interval: u32,
    pub days_of_week: Vec<u8>,
    pub day_of_month: Option<u8>,
    pub next_fire: DateTime<Utc>,
    pub active: bool,
}

/// A channel a reminder or notification can be delivered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Push,
}

/// A reminder attached to a task: fires `offset` before `due_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub task_id: TaskId,
    pub owner_id: OwnerId,
    pub offset: FireOffset,
    pub channels: Vec<NotificationChannel>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Reminder {
    #[must_use]
    pub fn is_due(&self, due_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.sent_at.is_none() && now >= due_at - self.offset.as_chrono_duration()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// One row per channel attempted for a single notification dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDeliveryRecord {
    pub id: NotificationId,
    pub owner_id: OwnerId,
    pub task_id: Option<TaskId>,
    pub channel: NotificationChannel,
    pub status: DeliveryStatus,
    pub message: String,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reminder_not_due_before_offset_window() {
        let due_at = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        let reminder = Reminder {
            id: ReminderId::new("r1"),
            task_id: TaskId::new("t1"),
            owner_id: OwnerId::new("o1"),
            offset: FireOffset::parse("PT1H").unwrap(),
            channels: vec![NotificationChannel::Email],
            sent_at: None,
        };
        let too_early = due_at - chrono::Duration::hours(2);
        assert!(!reminder.is_due(due_at, too_early));
        let on_window = due_at - chrono::Duration::hours(1);
        assert!(reminder.is_due(due_at, on_window));
    }

    #[test]
    fn reminder_already_sent_is_never_due_again() {
        let due_at = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        let reminder = Reminder {
            id: ReminderId::new("r1"),
            task_id: TaskId::new("t1"),
            owner_id: OwnerId::new("o1"),
            offset: FireOffset::parse("PT1H").unwrap(),
            channels: vec![NotificationChannel::Email],
            sent_at: Some(due_at),
        };
        assert!(!reminder.is_due(due_at, due_at));
    }
}
