use taskwire_core::{DurationError, InvalidRecurrenceSpec};
use taskwire_store::NotFound;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("a reminder requires the task to have a due date")]
    ReminderWithoutDue,
    #[error("a recurrence requires the task to have a due date")]
    RecurrenceWithoutDue,
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("task title must not exceed 255 characters")]
    TitleTooLong,
    #[error("task description must not exceed 2000 characters")]
    DescriptionTooLong,
    #[error(transparent)]
    Offset(#[from] DurationError),
    #[error(transparent)]
    Recurrence(#[from] InvalidRecurrenceSpec),
    #[error("task not found")]
    NotFound(#[from] NotFound),
}
