pub mod delivery_store;
pub mod error;
pub mod reminder_store;
pub mod recurrence_store;
pub mod task_store;

pub use delivery_store::{DeliveryStore, InMemoryDeliveryStore};
pub use error::NotFound;
pub use reminder_store::{InMemoryReminderStore, ReminderStore};
pub use recurrence_store::{InMemoryRecurrenceStore, RecurrenceStore};
pub use task_store::{InMemoryTaskStore, TaskStore};
