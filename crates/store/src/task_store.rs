use std::collections::HashMap;
use std::sync::RwLock;

use taskwire_core::{OwnerId, Task, TaskId};

use crate::error::NotFound;

/// Durable task records, ownership-checked CRUD (C5).
pub trait TaskStore: Send + Sync {
    fn insert(&self, task: Task);

    /// Fetch a task, failing (collapsed to `NotFound`) if it does not exist
    /// or belongs to a different owner.
    fn get(&self, id: &TaskId, owner_id: &OwnerId) -> Result<Task, NotFound>;

    /// Fetch a task regardless of owner, for internal cross-tenant workers
    /// (the reminder scheduler, the recurrence engine). Not exposed at any
    /// user-facing edge.
    fn get_any(&self, id: &TaskId) -> Option<Task>;

    fn update(&self, task: Task, owner_id: &OwnerId) -> Result<Task, NotFound>;

    /// Returns `true` if a task was deleted, `false` if it was already gone.
    fn delete(&self, id: &TaskId, owner_id: &OwnerId) -> bool;

    /// Tasks owned by `owner_id`, sorted by `created_at` descending.
    fn list_by_owner(&self, owner_id: &OwnerId) -> Vec<Task>;
}

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn insert(&self, task: Task) {
        self.tasks.write().unwrap().insert(task.id.clone(), task);
    }

    fn get(&self, id: &TaskId, owner_id: &OwnerId) -> Result<Task, NotFound> {
        self.tasks
            .read()
            .unwrap()
            .get(id)
            .filter(|t| &t.owner_id == owner_id)
            .cloned()
            .ok_or(NotFound)
    }

    fn get_any(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().unwrap().get(id).cloned()
    }

    fn update(&self, task: Task, owner_id: &OwnerId) -> Result<Task, NotFound> {
        let mut guard = self.tasks.write().unwrap();
        let existing = guard.get(&task.id).ok_or(NotFound)?;
        if &existing.owner_id != owner_id {
            return Err(NotFound);
        }
        guard.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn delete(&self, id: &TaskId, owner_id: &OwnerId) -> bool {
        let mut guard = self.tasks.write().unwrap();
        match guard.get(id) {
            Some(t) if &t.owner_id == owner_id => {
                guard.remove(id);
                true
            }
            _ => false,
        }
    }

    fn list_by_owner(&self, owner_id: &OwnerId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .unwrap()
            .values()
            .filter(|t| &t.owner_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }
}
