use taskwire_ledger::LedgerError;
use taskwire_lifecycle::LifecycleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecurrenceEngineError {
    #[error("completed task {0} has no source record to clone metadata from")]
    SourceTaskMissing(String),
    #[error("recurring task {0} completed without a due date, cannot compute next occurrence")]
    MissingDueAt(String),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
