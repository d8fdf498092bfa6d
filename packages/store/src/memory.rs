use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::StreamExt;
use tokio::sync::watch;

use crate::document::{owner_of, Document, Snapshot, StoredDocument};
use crate::error::StoreError;
use crate::gateway::{DocumentStore, SnapshotStream};
use crate::models::DocId;

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Vec<StoredDocument>>,
    offline: bool,
}

/// In-memory DocumentStore with realtime snapshots, for tests and local use.
///
/// Every successful write bumps a version published on a `watch` channel; each live
/// subscription re-reads its owner-filtered result set when the version moves.
/// Documents keep insertion order, which is the order snapshots are delivered in.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    version: Arc<watch::Sender<u64>>,
    live: Arc<AtomicUsize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            version: Arc::new(version),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate a lost connection: writes and snapshots fail until cleared.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
        self.bump();
    }

    /// Number of subscription streams currently alive.
    pub fn live_subscriptions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Every document in a collection regardless of owner.
    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    fn snapshot(&self, collection: &str, owner_id: &str) -> Result<Snapshot, StoreError> {
        let inner = self.lock();
        if inner.offline {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.owner() == Some(owner_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn check_online(inner: &Inner) -> Result<(), StoreError> {
        if inner.offline {
            Err(StoreError::Unavailable("memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

/// Keeps the live-subscription count accurate for as long as a stream exists.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("memory subscription released");
    }
}

struct Subscription {
    store: MemoryStore,
    changes: watch::Receiver<u64>,
    collection: String,
    owner_id: String,
    primed: bool,
    _guard: LiveGuard,
}

impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, data: Document) -> Result<DocId, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        {
            let mut inner = self.lock();
            Self::check_online(&inner)?;
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(StoredDocument {
                    id: id.clone(),
                    data,
                });
        }
        self.bump();
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, data: Document) -> Result<(), StoreError> {
        {
            let mut inner = self.lock();
            Self::check_online(&inner)?;
            let doc = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            if doc.owner() != owner_of(&data) {
                return Err(StoreError::PermissionDenied);
            }
            for (key, value) in data {
                doc.data.insert(key, value);
            }
        }
        self.bump();
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        {
            let mut inner = self.lock();
            Self::check_online(&inner)?;
            if let Some(docs) = inner.collections.get_mut(collection) {
                docs.retain(|d| d.id != id);
            }
        }
        self.bump();
        Ok(())
    }

    fn subscribe(&self, collection: &str, owner_id: &str) -> SnapshotStream {
        tracing::debug!(collection, owner_id, "memory subscription opened");
        let sub = Subscription {
            store: self.clone(),
            changes: self.version.subscribe(),
            collection: collection.to_string(),
            owner_id: owner_id.to_string(),
            primed: false,
            _guard: LiveGuard::new(self.live.clone()),
        };
        futures::stream::unfold(sub, |mut sub| async move {
            if sub.primed {
                sub.changes.changed().await.ok()?;
            }
            sub.primed = true;
            let _ = *sub.changes.borrow_and_update();
            let snapshot = sub.store.snapshot(&sub.collection, &sub.owner_id);
            Some((snapshot, sub))
        })
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::encode;
    use crate::gateway::Collection;
    use crate::models::{Appointment, IntakeLog, IntakeType};

    fn appointment(kind: &str, purpose: &str) -> Appointment {
        Appointment {
            kind: kind.into(),
            purpose: purpose.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_subscribe() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());

        let mut stream = appointments.subscribe("alice");
        assert!(stream.next().await.unwrap().unwrap().is_empty());

        let id = appointments
            .create("alice", &appointment("Dentist", "Cleaning"))
            .await
            .unwrap();

        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].owner_id, "alice");
        assert_eq!(snapshot[0].fields.purpose, "Cleaning");
    }

    #[tokio::test]
    async fn test_subscription_filters_by_owner() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());

        appointments
            .create("alice", &appointment("Dentist", "Cleaning"))
            .await
            .unwrap();
        appointments
            .create("bob", &appointment("Cardiologist", "ECG"))
            .await
            .unwrap();

        let mut stream = appointments.subscribe("bob");
        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].fields.kind, "Cardiologist");
    }

    #[tokio::test]
    async fn test_snapshots_keep_insertion_order() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());
        for purpose in ["Checkup", "Vaccination", "Screening"] {
            appointments
                .create("alice", &appointment("Family Doctor", purpose))
                .await
                .unwrap();
        }

        let mut stream = appointments.subscribe("alice");
        let purposes: Vec<String> = stream
            .next()
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|e| e.fields.purpose)
            .collect();
        assert_eq!(purposes, ["Checkup", "Vaccination", "Screening"]);
    }

    #[tokio::test]
    async fn test_update_overwrites_and_keeps_owner() {
        let store = MemoryStore::new();
        let logs = Collection::<_, IntakeLog>::new(store.clone());
        let id = logs
            .create(
                "alice",
                &IntakeLog {
                    intake_type: IntakeType::Drink,
                    specific_intake: "Tea".into(),
                    notes: "with honey".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let mut stream = logs.subscribe("alice");
        let mut entry = stream.next().await.unwrap().unwrap().remove(0);
        entry.fields.notes = String::new();
        logs.update(&entry).await.unwrap();

        let updated = stream.next().await.unwrap().unwrap().remove(0);
        assert_eq!(updated.id, id);
        assert_eq!(updated.owner_id, "alice");
        assert_eq!(updated.fields.notes, "");
        assert_eq!(updated.fields.specific_intake, "Tea");
    }

    #[tokio::test]
    async fn test_update_rejects_owner_change() {
        let store = MemoryStore::new();
        let id = store
            .create("logs", encode("alice", &IntakeLog::default()).unwrap())
            .await
            .unwrap();

        let err = store
            .update("logs", &id, encode("mallory", &IntakeLog::default()).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryStore::new();
        let err = store
            .update("logs", "nope", encode("alice", &IntakeLog::default()).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_delete_removes_from_snapshot() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());
        let id = appointments
            .create("alice", &appointment("Dentist", "Filling"))
            .await
            .unwrap();

        let mut stream = appointments.subscribe("alice");
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 1);

        appointments.delete(&id).await.unwrap();
        assert!(stream.next().await.unwrap().unwrap().is_empty());
        assert!(store.documents("appointments").is_empty());
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_subscription() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());

        let first = appointments.subscribe("alice");
        let second = appointments.subscribe("bob");
        assert_eq!(store.live_subscriptions(), 2);

        drop(first);
        assert_eq!(store.live_subscriptions(), 1);
        drop(second);
        assert_eq!(store.live_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_offline_store_fails_without_ending_stream() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());
        let mut stream = appointments.subscribe("alice");
        assert!(stream.next().await.unwrap().is_ok());

        store.set_offline(true);
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            appointments
                .create("alice", &appointment("Dentist", "Braces"))
                .await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_offline(false);
        assert!(stream.next().await.unwrap().unwrap().is_empty());
    }
}
