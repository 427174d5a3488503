use std::collections::HashMap;
use std::sync::RwLock;

use taskwire_core::{OwnerId, RecurrenceConfig, RecurrenceId, TaskId};

use crate::error::NotFound;

/// Durable recurrence configs linked to tasks (C7).
pub trait RecurrenceStore: Send + Sync {
    fn insert(&self, recurrence: RecurrenceConfig);

    /// Recurrences queried by task id (spec's mandated access pattern).
    fn get_by_task(&self, task_id: &TaskId) -> Option<RecurrenceConfig>;

    fn update(&self, recurrence: RecurrenceConfig, owner_id: &OwnerId) -> Result<(), NotFound>;

    /// Cascades from task deletion: set-null, i.e. drop the row rather than
    /// leaving a dangling task reference.
    fn delete_by_task(&self, task_id: &TaskId);
}

#[derive(Default)]
pub struct InMemoryRecurrenceStore {
    by_id: RwLock<HashMap<RecurrenceId, RecurrenceConfig>>,
}

impl InMemoryRecurrenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecurrenceStore for InMemoryRecurrenceStore {
    fn insert(&self, recurrence: RecurrenceConfig) {
        self.by_id
            .write()
            .unwrap()
            .insert(recurrence.id.clone(), recurrence);
    }

    fn get_by_task(&self, task_id: &TaskId) -> Option<RecurrenceConfig> {
        self.by_id
            .read()
            .unwrap()
            .values()
            .find(|r| &r.task_id == task_id)
            .cloned()
    }

    fn update(&self, recurrence: RecurrenceConfig, owner_id: &OwnerId) -> Result<(), NotFound> {
        let mut guard = self.by_id.write().unwrap();
        let existing = guard.get(&recurrence.id).ok_or(NotFound)?;
        if &existing.owner_id != owner_id {
            return Err(NotFound);
        }
        guard.insert(recurrence.id.clone(), recurrence);
        Ok(())
    }

    fn delete_by_task(&self, task_id: &TaskId) {
        self.by_id
            .write()
            .unwrap()
            .retain(|_, r| &r.task_id != task_id);
    }
}
