use chrono::{DateTime, Utc};
use taskwire_core::{FireOffset, NotificationChannel, Priority, RecurrencePattern};

/// A reminder to attach to a new task.
#[derive(Debug, Clone)]
pub struct ReminderSpec {
    pub offset: FireOffset,
    pub channels: Vec<NotificationChannel>,
}

/// A recurrence rule to attach to a new task.
#[derive(Debug, Clone)]
pub struct RecurrenceSpec {
    pub pattern: RecurrencePattern,
    pub interval: u32,
    pub days_of_week: Vec<u8>,
    pub day_of_month: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub recurrence: Option<RecurrenceSpec>,
    pub reminders: Vec<ReminderSpec>,
}

impl CreateTaskRequest {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            tags: Vec::new(),
            due_at: None,
            recurrence: None,
            reminders: Vec::new(),
        }
    }
}

/// A partial update to an existing task. `None` means "leave unchanged";
/// the double-`Option` fields distinguish "leave unchanged" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
}
