//! Core-level validation errors.

use thiserror::Error;

use crate::duration::DurationError;
use crate::recurrence::InvalidRecurrenceSpec;

/// Validation failures raised while constructing domain entities, before any
/// persistence or event publication is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("reminder offset: {0}")]
    Offset(#[from] DurationError),
    #[error("recurrence spec: {0}")]
    Recurrence(#[from] InvalidRecurrenceSpec),
    #[error("reminder requires at least one notification channel")]
    NoChannels,
}
