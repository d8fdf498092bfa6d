//! # Remote document store
//!
//! [`RemoteStore`] implements [`DocumentStore`] over the api server functions. A
//! subscription fetches the owner's documents once, then fetches again whenever this
//! client writes to the store or the poll interval elapses. Each fetch is delivered as
//! a full snapshot, so the stream behaves exactly like a push subscription as far as
//! the list engine is concerned.

use std::cell::Cell;
use std::pin::pin;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{select, Either};
use futures::stream::{self, StreamExt};
use store::{DocId, Document, DocumentStore, Snapshot, SnapshotStream, StoreError};
use tokio::sync::watch;

/// Sleep on whichever timer the target provides.
pub(crate) async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}

#[derive(Clone)]
pub struct RemoteStore {
    version: Rc<watch::Sender<u64>>,
    poll_secs: Rc<Cell<u32>>,
}

impl Default for RemoteStore {
    fn default() -> Self {
        Self::new(store::config::DEFAULT_POLL_INTERVAL_SECS)
    }
}

impl RemoteStore {
    pub fn new(poll_secs: u32) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            version: Rc::new(version),
            poll_secs: Rc::new(Cell::new(poll_secs)),
        }
    }

    /// Change the poll interval of every open subscription. 0 disables polling.
    pub fn set_poll_interval(&self, secs: u32) {
        self.poll_secs.set(secs);
    }

    /// Wake every subscription so it fetches again.
    pub fn refresh(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

async fn fetch(collection: &str, owner_id: &str) -> Result<Snapshot, StoreError> {
    let docs = api::list_documents(collection.to_string())
        .await
        .map_err(|e| api::store_error(&e))?;
    Ok(docs
        .into_iter()
        .filter(|doc| doc.owner() == Some(owner_id))
        .collect())
}

/// Wait for a local write or the next poll. False once nothing can wake us again.
async fn wait_for_change(changes: &mut watch::Receiver<u64>, poll_secs: u32) -> bool {
    if poll_secs == 0 {
        return changes.changed().await.is_ok();
    }
    let tick = sleep(Duration::from_secs(u64::from(poll_secs)));
    match select(pin!(changes.changed()), pin!(tick)).await {
        Either::Left((changed, _)) => changed.is_ok(),
        Either::Right(_) => true,
    }
}

impl DocumentStore for RemoteStore {
    async fn create(&self, collection: &str, data: Document) -> Result<DocId, StoreError> {
        let id = api::create_document(collection.to_string(), data)
            .await
            .map_err(|e| api::store_error(&e))?;
        self.refresh();
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, data: Document) -> Result<(), StoreError> {
        api::update_document(collection.to_string(), id.to_string(), data)
            .await
            .map_err(|e| api::store_error(&e))?;
        self.refresh();
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        api::delete_document(collection.to_string(), id.to_string())
            .await
            .map_err(|e| api::store_error(&e))?;
        self.refresh();
        Ok(())
    }

    fn subscribe(&self, collection: &str, owner_id: &str) -> SnapshotStream {
        let collection = collection.to_string();
        let owner_id = owner_id.to_string();
        let poll_secs = self.poll_secs.clone();
        let changes = self.version.subscribe();
        tracing::debug!(%collection, "opening remote subscription");

        stream::unfold((changes, true), move |(mut changes, first)| {
            let collection = collection.clone();
            let owner_id = owner_id.clone();
            let poll_secs = poll_secs.get();
            async move {
                if !first && !wait_for_change(&mut changes, poll_secs).await {
                    return None;
                }
                let snapshot = fetch(&collection, &owner_id).await;
                if let Err(e) = &snapshot {
                    tracing::warn!(%collection, error = %e, "remote fetch failed");
                }
                Some((snapshot, (changes, false)))
            }
        })
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_write_wakes_waiters() {
        let store = RemoteStore::new(0);
        let mut changes = store.version.subscribe();
        store.refresh();
        assert!(wait_for_change(&mut changes, 0).await);
    }

    #[tokio::test]
    async fn test_poll_tick_wakes_waiters() {
        let store = RemoteStore::new(1);
        let mut changes = store.version.subscribe();
        tokio::time::pause();
        assert!(wait_for_change(&mut changes, 1).await);
    }

    #[tokio::test]
    async fn test_dropped_store_ends_wait_without_polling() {
        let store = RemoteStore::new(0);
        let mut changes = store.version.subscribe();
        drop(store);
        assert!(!wait_for_change(&mut changes, 0).await);
    }
}
