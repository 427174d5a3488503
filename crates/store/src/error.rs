use thiserror::Error;

/// Collapsed not-found/not-owned error: store layers never reveal whether a
/// record exists under a different owner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("not found")]
pub struct NotFound;
