//! Task lifecycle service (C9): CRUD and completion semantics, the single
//! writer for task/reminder/recurrence state and the sole source of
//! `task.*` events.

pub mod error;
pub mod requests;

pub use error::LifecycleError;
pub use requests::{CreateTaskRequest, RecurrenceSpec, ReminderSpec, TaskPatch};

use std::sync::Arc;

use taskwire_core::envelope::RecurrenceDescriptor;
use taskwire_core::{
    Clock, EventPayload, OwnerId, RecurrenceConfig, RecurrenceId, Reminder, ReminderId, Task,
    TaskId, next_occurrence,
};
use taskwire_publisher::EventPublisher;
use taskwire_store::{RecurrenceStore, ReminderStore, TaskStore};

pub const TASK_EVENTS_TOPIC: &str = "task-events";

const MAX_TITLE_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 2000;

fn validate_title(title: &str) -> Result<(), LifecycleError> {
    if title.trim().is_empty() {
        return Err(LifecycleError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(LifecycleError::TitleTooLong);
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), LifecycleError> {
    if let Some(description) = description
        && description.chars().count() > MAX_DESCRIPTION_LEN
    {
        return Err(LifecycleError::DescriptionTooLong);
    }
    Ok(())
}

pub struct TaskLifecycle {
    tasks: Arc<dyn TaskStore>,
    reminders: Arc<dyn ReminderStore>,
    recurrences: Arc<dyn RecurrenceStore>,
    publisher: Arc<EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl TaskLifecycle {
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        reminders: Arc<dyn ReminderStore>,
        recurrences: Arc<dyn RecurrenceStore>,
        publisher: Arc<EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            reminders,
            recurrences,
            publisher,
            clock,
        }
    }

    /// Validates, persists the task plus any recurrence/reminders, and
    /// publishes `task.created.v1`. Persistence failure is fatal and no
    /// event is published; publish failure is logged by the publisher and
    /// swallowed here (its own retry/buffer path owns eventual delivery).
    pub async fn create_task(
        &self,
        owner_id: OwnerId,
        request: CreateTaskRequest,
    ) -> Result<Task, LifecycleError> {
        validate_title(&request.title)?;
        validate_description(request.description.as_deref())?;
        if !request.reminders.is_empty() && request.due_at.is_none() {
            return Err(LifecycleError::ReminderWithoutDue);
        }
        if request.recurrence.is_some() && request.due_at.is_none() {
            return Err(LifecycleError::RecurrenceWithoutDue);
        }

        let now = self.clock.now();
        let task = Task {
            id: TaskId::new(uuid::Uuid::new_v4().to_string()),
            owner_id: owner_id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            priority: request.priority,
            tags: request.tags.clone(),
            due_at: request.due_at,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(task.clone());

        let recurrence_descriptor = if let Some(spec) = &request.recurrence {
            let due_at = request.due_at.expect("validated above");
            let next_fire = next_occurrence(
                due_at,
                spec.pattern,
                spec.interval,
                &spec.days_of_week,
                spec.day_of_month,
            )?;
            let config = RecurrenceConfig {
                id: RecurrenceId::new(uuid::Uuid::new_v4().to_string()),
                task_id: task.id.clone(),
                owner_id: owner_id.clone(),
                pattern: spec.pattern,
                interval: spec.interval,
                days_of_week: spec.days_of_week.clone(),
                day_of_month: spec.day_of_month,
                next_fire,
                active: true,
            };
            self.recurrences.insert(config.clone());
            Some(RecurrenceDescriptor {
                pattern: config.pattern,
                interval: config.interval,
                days_of_week: config.days_of_week,
                day_of_month: config.day_of_month,
            })
        } else {
            None
        };

        for spec in &request.reminders {
            let reminder = Reminder {
                id: ReminderId::new(uuid::Uuid::new_v4().to_string()),
                task_id: task.id.clone(),
                owner_id: owner_id.clone(),
                offset: spec.offset,
                channels: spec.channels.clone(),
                sent_at: None,
            };
            self.reminders.insert(reminder);
        }

        let payload = EventPayload::TaskCreated {
            task_id: task.id.clone(),
            owner_id: owner_id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            tags: task.tags.clone(),
            due_at: task.due_at,
            recurrence: recurrence_descriptor,
            created_at: task.created_at,
        };
        let _ = self.publisher.publish(TASK_EVENTS_TOPIC, payload, None).await;

        Ok(task)
    }

    /// Diffs `patch` against the stored task; persists and publishes
    /// `task.updated.v1` only if at least one field differs.
    pub async fn update_task(
        &self,
        id: &TaskId,
        owner_id: &OwnerId,
        patch: TaskPatch,
    ) -> Result<Task, LifecycleError> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(description) = &patch.description {
            validate_description(description.as_deref())?;
        }

        let mut task = self.tasks.get(id, owner_id)?;
        let mut changes = serde_json::Map::new();

        if let Some(title) = patch.title {
            if title != task.title {
                changes.insert(
                    "title".into(),
                    serde_json::json!({"old": task.title, "new": title}),
                );
                task.title = title;
            }
        }
        if let Some(description) = patch.description {
            if description != task.description {
                changes.insert(
                    "description".into(),
                    serde_json::json!({"old": task.description, "new": description}),
                );
                task.description = description;
            }
        }
        if let Some(priority) = patch.priority {
            if priority != task.priority {
                changes.insert(
                    "priority".into(),
                    serde_json::json!({"old": task.priority, "new": priority}),
                );
                task.priority = priority;
            }
        }
        if let Some(tags) = patch.tags {
            if tags != task.tags {
                changes.insert(
                    "tags".into(),
                    serde_json::json!({"old": task.tags, "new": tags}),
                );
                task.tags = tags;
            }
        }
        if let Some(due_at) = patch.due_at {
            if due_at != task.due_at {
                changes.insert(
                    "due_at".into(),
                    serde_json::json!({"old": task.due_at, "new": due_at}),
                );
                task.due_at = due_at;
            }
        }

        if changes.is_empty() {
            return Ok(task);
        }

        task.updated_at = self.clock.now();
        let updated = self.tasks.update(task, owner_id)?;

        let payload = EventPayload::TaskUpdated {
            task_id: updated.id.clone(),
            owner_id: owner_id.clone(),
            changes: serde_json::Value::Object(changes),
            updated_at: updated.updated_at,
        };
        let _ = self.publisher.publish(TASK_EVENTS_TOPIC, payload, None).await;

        Ok(updated)
    }

    /// Marks a task complete. A no-op (no persistence, no event) if the
    /// task is already completed — only the pending→completed edge fires
    /// `task.completed.v1`.
    pub async fn complete_task(
        &self,
        id: &TaskId,
        owner_id: &OwnerId,
    ) -> Result<Task, LifecycleError> {
        let mut task = self.tasks.get(id, owner_id)?;
        if task.completed {
            return Ok(task);
        }

        let now = self.clock.now();
        task.completed = true;
        task.completed_at = Some(now);
        task.updated_at = now;
        let updated = self.tasks.update(task, owner_id)?;

        let recurrence_descriptor = self.recurrences.get_by_task(&updated.id).map(|config| {
            RecurrenceDescriptor {
                pattern: config.pattern,
                interval: config.interval,
                days_of_week: config.days_of_week,
                day_of_month: config.day_of_month,
            }
        });

        let payload = EventPayload::TaskCompleted {
            task_id: updated.id.clone(),
            owner_id: owner_id.clone(),
            completed_at: now,
            due_at: updated.due_at,
            recurrence: recurrence_descriptor,
        };
        let _ = self.publisher.publish(TASK_EVENTS_TOPIC, payload, None).await;

        Ok(updated)
    }

    /// Reverses a completion: `completed → pending`. Publishes
    /// `task.updated.v1` with `{completed: {old: true, new: false}}`; does
    /// not cancel or inspect any successor task the recurrence engine may
    /// already have created.
    pub async fn toggle_pending(
        &self,
        id: &TaskId,
        owner_id: &OwnerId,
    ) -> Result<Task, LifecycleError> {
        let mut task = self.tasks.get(id, owner_id)?;
        if !task.completed {
            return Ok(task);
        }

        task.completed = false;
        task.completed_at = None;
        task.updated_at = self.clock.now();
        let updated = self.tasks.update(task, owner_id)?;

        let payload = EventPayload::TaskUpdated {
            task_id: updated.id.clone(),
            owner_id: owner_id.clone(),
            changes: serde_json::json!({"completed": {"old": true, "new": false}}),
            updated_at: updated.updated_at,
        };
        let _ = self.publisher.publish(TASK_EVENTS_TOPIC, payload, None).await;

        Ok(updated)
    }

    /// Idempotent delete: returns `false` if the task was already gone.
    /// Cascades to reminders and recurrence config before publishing
    /// `task.deleted.v1`.
    pub async fn delete_task(&self, id: &TaskId, owner_id: &OwnerId) -> bool {
        if !self.tasks.delete(id, owner_id) {
            return false;
        }
        self.reminders.delete_by_task(id);
        self.recurrences.delete_by_task(id);

        let payload = EventPayload::TaskDeleted {
            task_id: id.clone(),
            owner_id: owner_id.clone(),
            deleted_at: self.clock.now(),
        };
        let _ = self.publisher.publish(TASK_EVENTS_TOPIC, payload, None).await;
        true
    }
}
