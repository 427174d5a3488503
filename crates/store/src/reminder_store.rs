use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use taskwire_core::{OwnerId, Reminder, ReminderId, TaskId};

use crate::error::NotFound;

/// Durable reminder rows with firing offset and sent marker (C6).
pub trait ReminderStore: Send + Sync {
    fn insert(&self, reminder: Reminder);

    fn get(&self, id: &ReminderId, owner_id: &OwnerId) -> Result<Reminder, NotFound>;

    /// Reminders for a task, unsorted (spec mandates no sort order here).
    fn list_by_task(&self, task_id: &TaskId) -> Vec<Reminder>;

    /// All reminders not yet sent, across every owner — used by the
    /// scheduler, which scans globally rather than per-tenant.
    fn list_unsent(&self) -> Vec<Reminder>;

    /// Marks a reminder sent at `now`. No-op (returns `Ok`) if already sent;
    /// `sent_at` is monotonic and is never overwritten once set.
    fn mark_sent(&self, id: &ReminderId, now: DateTime<Utc>) -> Result<(), NotFound>;

    /// Cascades from task deletion: removes every reminder for `task_id`.
    fn delete_by_task(&self, task_id: &TaskId);
}

#[derive(Default)]
pub struct InMemoryReminderStore {
    reminders: RwLock<HashMap<ReminderId, Reminder>>,
}

impl InMemoryReminderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReminderStore for InMemoryReminderStore {
    fn insert(&self, reminder: Reminder) {
        self.reminders
            .write()
            .unwrap()
            .insert(reminder.id.clone(), reminder);
    }

    fn get(&self, id: &ReminderId, owner_id: &OwnerId) -> Result<Reminder, NotFound> {
        self.reminders
            .read()
            .unwrap()
            .get(id)
            .filter(|r| &r.owner_id == owner_id)
            .cloned()
            .ok_or(NotFound)
    }

    fn list_by_task(&self, task_id: &TaskId) -> Vec<Reminder> {
        self.reminders
            .read()
            .unwrap()
            .values()
            .filter(|r| &r.task_id == task_id)
            .cloned()
            .collect()
    }

    fn list_unsent(&self) -> Vec<Reminder> {
        self.reminders
            .read()
            .unwrap()
            .values()
            .filter(|r| r.sent_at.is_none())
            .cloned()
            .collect()
    }

    fn mark_sent(&self, id: &ReminderId, now: DateTime<Utc>) -> Result<(), NotFound> {
        let mut guard = self.reminders.write().unwrap();
        let reminder = guard.get_mut(id).ok_or(NotFound)?;
        if reminder.sent_at.is_none() {
            reminder.sent_at = Some(now);
        }
        Ok(())
    }

    fn delete_by_task(&self, task_id: &TaskId) {
        self.reminders
            .write()
            .unwrap()
            .retain(|_, r| &r.task_id != task_id);
    }
}
