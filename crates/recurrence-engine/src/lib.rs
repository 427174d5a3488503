//! Recurrence engine (C11): consumes `task.completed.v1` and, for tasks
//! with a recurrence descriptor, creates the next occurrence.

pub mod error;

pub use error::RecurrenceEngineError;

use std::sync::Arc;
use std::time::Duration;

use taskwire_core::envelope::RecurrenceDescriptor;
use taskwire_core::{EventEnvelope, EventPayload, OwnerId, TaskId};
use taskwire_ledger::{ClaimOutcome, IdempotencyLedger, DEFAULT_TTL_HOURS};
use taskwire_lifecycle::{CreateTaskRequest, RecurrenceSpec, TaskLifecycle};
use taskwire_store::TaskStore;
use tracing::{info, warn};

/// The consumer name this service claims idempotency under (C4).
pub const CONSUMER: &str = "recurring-task-service";

pub struct RecurrenceEngine {
    tasks: Arc<dyn TaskStore>,
    lifecycle: Arc<TaskLifecycle>,
    ledger: Arc<IdempotencyLedger>,
    ttl_hours: i64,
}

impl RecurrenceEngine {
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        lifecycle: Arc<TaskLifecycle>,
        ledger: Arc<IdempotencyLedger>,
    ) -> Self {
        Self {
            tasks,
            lifecycle,
            ledger,
            ttl_hours: DEFAULT_TTL_HOURS,
        }
    }

    #[must_use]
    pub fn with_ttl_hours(mut self, ttl_hours: i64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }

    /// Handles one `task.completed.v1` envelope. Non-completion events and
    /// events without a recurrence descriptor are a no-op. A duplicate claim
    /// is a no-op too — at-least-once delivery plus the (event_id, consumer)
    /// claim guarantees each completion produces at most one successor.
    pub async fn handle(&self, envelope: &EventEnvelope) -> Result<(), RecurrenceEngineError> {
        let EventPayload::TaskCompleted {
            task_id,
            owner_id,
            due_at,
            recurrence,
            ..
        } = &envelope.payload
        else {
            return Ok(());
        };

        let ttl = Duration::from_secs(u64::try_from(self.ttl_hours).unwrap_or(168) * 3600);
        if self
            .ledger
            .claim(&envelope.event_id, CONSUMER, envelope.event_type(), ttl)
            == ClaimOutcome::Duplicate
        {
            return Ok(());
        }

        let Some(descriptor) = recurrence else {
            return Ok(());
        };

        match self
            .create_successor(task_id, owner_id, *due_at, descriptor)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = self
                    .ledger
                    .record_failure(&envelope.event_id, CONSUMER, err.to_string());
                warn!(task_id = %task_id, %err, "failed to create recurring successor task");
                Err(err)
            }
        }
    }

    async fn create_successor(
        &self,
        task_id: &TaskId,
        owner_id: &OwnerId,
        due_at: Option<chrono::DateTime<chrono::Utc>>,
        descriptor: &RecurrenceDescriptor,
    ) -> Result<(), RecurrenceEngineError> {
        let due_at = due_at.ok_or_else(|| RecurrenceEngineError::MissingDueAt(task_id.to_string()))?;
        let source = self
            .tasks
            .get_any(task_id)
            .ok_or_else(|| RecurrenceEngineError::SourceTaskMissing(task_id.to_string()))?;

        let next_due = taskwire_core::next_occurrence(
            due_at,
            descriptor.pattern,
            descriptor.interval,
            &descriptor.days_of_week,
            descriptor.day_of_month,
        )
        .map_err(|err| RecurrenceEngineError::Lifecycle(err.into()))?;

        let mut request = CreateTaskRequest::new(source.title.clone());
        request.description = source.description.clone();
        request.priority = source.priority;
        request.tags = source.tags.clone();
        request.due_at = Some(next_due);
        request.recurrence = Some(RecurrenceSpec {
            pattern: descriptor.pattern,
            interval: descriptor.interval,
            days_of_week: descriptor.days_of_week.clone(),
            day_of_month: descriptor.day_of_month,
        });

        let created = self.lifecycle.create_task(owner_id.clone(), request).await?;
        info!(source_task_id = %task_id, new_task_id = %created.id, "created recurring successor task");
        Ok(())
    }
}
