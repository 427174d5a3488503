use std::sync::RwLock;

use taskwire_core::{NotificationDeliveryRecord, OwnerId};

/// Append-only notification delivery rows, one per channel attempted for a
/// dispatch (C12's audit trail).
pub trait DeliveryStore: Send + Sync {
    fn insert(&self, record: NotificationDeliveryRecord);

    fn list_by_owner(&self, owner_id: &OwnerId) -> Vec<NotificationDeliveryRecord>;
}

#[derive(Default)]
pub struct InMemoryDeliveryStore {
    records: RwLock<Vec<NotificationDeliveryRecord>>,
}

impl InMemoryDeliveryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeliveryStore for InMemoryDeliveryStore {
    fn insert(&self, record: NotificationDeliveryRecord) {
        self.records.write().unwrap().push(record);
    }

    fn list_by_owner(&self, owner_id: &OwnerId) -> Vec<NotificationDeliveryRecord> {
        self.records
            .read()
            .unwrap()
            .iter()
            .filter(|r| &r.owner_id == owner_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskwire_core::{DeliveryStatus, NotificationChannel, NotificationId, TaskId};

    fn record(owner: &str) -> NotificationDeliveryRecord {
        NotificationDeliveryRecord {
            id: NotificationId::new("n1"),
            owner_id: OwnerId::new(owner),
            task_id: Some(TaskId::new("t1")),
            channel: NotificationChannel::Email,
            status: DeliveryStatus::Sent,
            message: "due soon".into(),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn list_by_owner_filters() {
        let store = InMemoryDeliveryStore::new();
        store.insert(record("alice"));
        store.insert(record("bob"));
        assert_eq!(store.list_by_owner(&OwnerId::new("alice")).len(), 1);
    }
}
