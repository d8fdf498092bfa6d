//! Two-phase delete: stage a target, then confirm.

use store::{Collection, DocumentStore, Entity, Entry, StoreError};

/// Pending delete for one entity kind. Nothing is removed until [`confirm`](Self::confirm).
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteConfirmation<E> {
    pending: Option<Entry<E>>,
    error: Option<StoreError>,
    busy: bool,
}

impl<E> Default for DeleteConfirmation<E> {
    fn default() -> Self {
        Self {
            pending: None,
            error: None,
            busy: false,
        }
    }
}

impl<E: Entity> DeleteConfirmation<E> {
    /// Open the confirmation for `entry`.
    pub fn stage(&mut self, entry: &Entry<E>) {
        self.pending = Some(entry.clone());
        self.error = None;
        self.busy = false;
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&Entry<E>> {
        self.pending.as_ref()
    }

    pub fn error(&self) -> Option<&StoreError> {
        self.error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Id to delete, if a target is staged.
    pub fn prepare_confirm(&mut self) -> Option<String> {
        let id = self.pending.as_ref()?.id.clone();
        self.busy = true;
        self.error = None;
        Some(id)
    }

    /// Clear the target on success; keep it staged for retry on failure.
    pub fn finish(&mut self, result: Result<(), StoreError>) -> Result<(), StoreError> {
        self.busy = false;
        match result {
            Ok(()) => {
                self.cancel();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(collection = E::COLLECTION, error = %e, "delete failed");
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn confirm<S: DocumentStore>(
        &mut self,
        collection: &Collection<S, E>,
    ) -> Result<(), StoreError> {
        let Some(id) = self.prepare_confirm() else {
            return Ok(());
        };
        let result = collection.delete(&id).await;
        self.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use store::{Appointment, MemoryStore};

    async fn seeded() -> (MemoryStore, Collection<MemoryStore, Appointment>, Entry<Appointment>) {
        let store = MemoryStore::new();
        let appointments = Collection::new(store.clone());
        let fields = Appointment {
            kind: "Dentist".into(),
            purpose: "Cleaning".into(),
            ..Default::default()
        };
        appointments.create("alice", &fields).await.unwrap();
        let entry = appointments.subscribe("alice").next().await.unwrap().unwrap().remove(0);
        (store, appointments, entry)
    }

    #[tokio::test]
    async fn test_staging_alone_deletes_nothing() {
        let (store, appointments, entry) = seeded().await;
        let mut confirm = DeleteConfirmation::default();

        confirm.stage(&entry);
        assert!(confirm.is_open());
        assert_eq!(store.documents("appointments").len(), 1);

        confirm.confirm(&appointments).await.unwrap();
        assert!(!confirm.is_open());
        assert!(store.documents("appointments").is_empty());
    }

    #[tokio::test]
    async fn test_cancel_clears_target() {
        let (store, appointments, entry) = seeded().await;
        let mut confirm = DeleteConfirmation::default();

        confirm.stage(&entry);
        confirm.cancel();
        assert!(confirm.pending().is_none());

        // Confirming after cancel is a no-op.
        confirm.confirm(&appointments).await.unwrap();
        assert_eq!(store.documents("appointments").len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_target_for_retry() {
        let (store, appointments, entry) = seeded().await;
        let mut confirm = DeleteConfirmation::default();
        confirm.stage(&entry);

        store.set_offline(true);
        assert!(confirm.confirm(&appointments).await.is_err());
        assert_eq!(confirm.pending().map(|e| e.id.as_str()), Some(entry.id.as_str()));
        assert!(matches!(confirm.error(), Some(StoreError::Unavailable(_))));

        store.set_offline(false);
        confirm.confirm(&appointments).await.unwrap();
        assert!(store.documents("appointments").is_empty());
    }
}
