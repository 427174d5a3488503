//! Idempotency ledger (C4): a durable `(event_id, consumer)` set with TTL.
//!
//! Composite-key claim semantics: the primary key `(event_id, consumer)`
//! gives atomic claim via conditional insert, mirroring the uniqueness
//! constraint the source relies on at the database layer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use taskwire_core::Clock;
use thiserror::Error;

/// Default ledger entry lifetime: 7 days (168 hours), per spec default.
pub const DEFAULT_TTL_HOURS: i64 = 168;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Fresh,
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Processed,
    Failed,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no ledger entry for event {event_id} / consumer {consumer}")]
    NoSuchEntry { event_id: String, consumer: String },
}

#[derive(Debug, Clone)]
struct Entry {
    event_type: String,
    status: EntryStatus,
    error: Option<String>,
    expires_at: DateTime<Utc>,
}

/// Claims `(event_id, consumer)` pairs at most once each, purging rows past
/// their TTL. Different consumers may independently claim the same event
/// id; the same consumer may not claim it twice.
pub struct IdempotencyLedger {
    entries: DashMap<(String, String), Entry>,
    clock: Arc<dyn Clock>,
}

impl IdempotencyLedger {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Attempt to claim `event_id` for `consumer`. A second claim by the
    /// same consumer for the same event id returns `Duplicate` without
    /// error; this is never surfaced as a conflict to the caller.
    pub fn claim(
        &self,
        event_id: &str,
        consumer: &str,
        event_type: &str,
        ttl: Duration,
    ) -> ClaimOutcome {
        let key = (event_id.to_owned(), consumer.to_owned());
        if let Some(mut existing) = self.entries.get_mut(&key) {
            let now = self.clock.now();
            if existing.expires_at > now {
                return ClaimOutcome::Duplicate;
            }
            // Expired row: treat as a fresh claim, resetting its window.
            existing.status = EntryStatus::Processed;
            existing.error = None;
            existing.expires_at = now + to_chrono(ttl);
            return ClaimOutcome::Fresh;
        }

        let now = self.clock.now();
        self.entries.insert(
            key,
            Entry {
                event_type: event_type.to_owned(),
                status: EntryStatus::Processed,
                error: None,
                expires_at: now + to_chrono(ttl),
            },
        );
        ClaimOutcome::Fresh
    }

    /// Records a processing failure against a previously claimed entry, so
    /// the broker can be told not to redeliver-as-duplicate — the consumer
    /// will see this as a fresh claim again once it retries, since the
    /// event is deliberately left un-ACKed upstream.
    pub fn record_failure(
        &self,
        event_id: &str,
        consumer: &str,
        error: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let key = (event_id.to_owned(), consumer.to_owned());
        let mut entry = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| LedgerError::NoSuchEntry {
                event_id: event_id.to_owned(),
                consumer: consumer.to_owned(),
            })?;
        entry.status = EntryStatus::Failed;
        entry.error = Some(error.into());
        Ok(())
    }

    #[must_use]
    pub fn status(&self, event_id: &str, consumer: &str) -> Option<EntryStatus> {
        self.entries
            .get(&(event_id.to_owned(), consumer.to_owned()))
            .map(|e| e.status)
    }

    /// Deletes every entry whose `expires_at` has passed. Intended to be
    /// called periodically by a background task.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(DEFAULT_TTL_HOURS))
}
