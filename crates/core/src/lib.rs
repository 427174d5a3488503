//! Core domain types shared across the taskwire event-driven task backbone.
//!
//! This crate has no I/O: ids, the injectable clock, restricted duration
//! parsing, the recurrence calculator, domain model entities, and the event
//! envelope all live here so every other crate can depend on a single,
//! dependency-light source of truth.

pub mod clock;
pub mod duration;
pub mod envelope;
pub mod error;
pub mod model;
pub mod recurrence;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use duration::{DurationError, FireOffset};
pub use envelope::{EventEnvelope, EventPayload, SCHEMA_VERSION};
pub use error::ValidationError;
pub use model::{
    DeliveryStatus, NotificationChannel, NotificationDeliveryRecord, Priority, RecurrenceConfig,
    Reminder, Task,
};
pub use recurrence::{InvalidRecurrenceSpec, RecurrencePattern, next_occurrence};
pub use types::{NotificationId, OwnerId, ReminderId, RecurrenceId, TaskId};
