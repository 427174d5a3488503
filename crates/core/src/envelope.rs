//! Event envelope and payload shapes (C2).
//!
//! Every event on the bus is wrapped in a uniform envelope; the payload is a
//! closed, tagged enum rather than an open `serde_json::Value` bag, so
//! consumers get compile-time exhaustiveness over the known event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::FireOffset;
use crate::model::{DeliveryStatus, NotificationChannel, Priority};
use crate::recurrence::RecurrencePattern;
use crate::types::{NotificationId, OwnerId, ReminderId, TaskId};

/// Recurrence anchors carried alongside `task.created.v1` and
/// `task.completed.v1` so a consumer can continue a recurrence chain
/// without a round-trip to the recurrence store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceDescriptor {
    pub pattern: RecurrencePattern,
    pub interval: u32,
    pub days_of_week: Vec<u8>,
    pub day_of_month: Option<u8>,
}

/// Current schema version stamped on every envelope.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: String,
    pub schema_version: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl EventEnvelope {
    #[must_use]
    pub fn new(event_id: impl Into<String>, timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            event_id: event_id.into(),
            schema_version: SCHEMA_VERSION,
            timestamp,
            payload,
        }
    }

    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data")]
pub enum EventPayload {
    #[serde(rename = "task.created.v1")]
    TaskCreated {
        task_id: TaskId,
        owner_id: OwnerId,
        title: String,
        description: Option<String>,
        priority: Priority,
        tags: Vec<String>,
        due_at: Option<DateTime<Utc>>,
        recurrence: Option<RecurrenceDescriptor>,
        created_at: DateTime<Utc>,
    },
    #[serde(rename = "task.updated.v1")]
    TaskUpdated {
        task_id: TaskId,
        owner_id: OwnerId,
        changes: serde_json::Value,
        updated_at: DateTime<Utc>,
    },
    #[serde(rename = "task.completed.v1")]
    TaskCompleted {
        task_id: TaskId,
        owner_id: OwnerId,
        completed_at: DateTime<Utc>,
        due_at: Option<DateTime<Utc>>,
        recurrence: Option<RecurrenceDescriptor>,
    },
    #[serde(rename = "task.deleted.v1")]
    TaskDeleted {
        task_id: TaskId,
        owner_id: OwnerId,
        deleted_at: DateTime<Utc>,
    },
    #[serde(rename = "reminder.due.v1")]
    ReminderDue {
        reminder_id: ReminderId,
        task_id: TaskId,
        owner_id: OwnerId,
        owner_email: String,
        task_title: String,
        task_description: Option<String>,
        due_at: DateTime<Utc>,
        remind_before: FireOffset,
        channels: Vec<NotificationChannel>,
    },
    #[serde(rename = "notification.sent.v1")]
    NotificationSent {
        notification_id: NotificationId,
        owner_id: OwnerId,
        task_id: Option<TaskId>,
        channel: NotificationChannel,
        message: String,
        sent_at: DateTime<Utc>,
    },
    #[serde(rename = "notification.failed.v1")]
    NotificationFailed {
        notification_id: NotificationId,
        owner_id: OwnerId,
        task_id: Option<TaskId>,
        channel: NotificationChannel,
        message: String,
        error: String,
        failed_at: DateTime<Utc>,
    },
}

impl EventPayload {
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TaskCreated { .. } => "task.created.v1",
            Self::TaskUpdated { .. } => "task.updated.v1",
            Self::TaskCompleted { .. } => "task.completed.v1",
            Self::TaskDeleted { .. } => "task.deleted.v1",
            Self::ReminderDue { .. } => "reminder.due.v1",
            Self::NotificationSent { .. } => "notification.sent.v1",
            Self::NotificationFailed { .. } => "notification.failed.v1",
        }
    }
}

impl From<DeliveryStatus> for &'static str {
    fn from(value: DeliveryStatus) -> Self {
        match value {
            DeliveryStatus::Sent => "notification.sent.v1",
            DeliveryStatus::Failed => "notification.failed.v1",
        }
    }
}
