//! # Gateway: the document store contract and its typed wrapper
//!
//! [`DocumentStore`] is the only persistence seam in Medicolog. It speaks in raw
//! [`Document`]s scoped to a named collection and offers exactly four operations:
//! create, full overwrite, delete by id, and an owner-filtered subscription.
//!
//! A subscription is a lazy, infinite stream of [`Snapshot`]s: the first item is the
//! current result set, and every later item is the complete result set after a change.
//! Errors are delivered as items and do not end the stream. Dropping the stream is the
//! only way to stop delivery, which makes "cancel" an ownership question rather than a
//! callback to remember.
//!
//! [`Collection`] binds a store to one [`Entity`] type and handles encoding, owner
//! stamping and decoding, so callers never touch raw documents.

use std::future::Future;
use std::marker::PhantomData;

use futures::stream::{LocalBoxStream, StreamExt};

use crate::document::{decode, encode, Document, Snapshot};
use crate::error::StoreError;
use crate::models::{DocId, Entity, Entry};

/// Stream of full snapshots for one subscribed query.
pub type SnapshotStream = LocalBoxStream<'static, Result<Snapshot, StoreError>>;

/// Stream of typed snapshots for one subscribed collection.
pub type EntryStream<E> = LocalBoxStream<'static, Result<Vec<Entry<E>>, StoreError>>;

/// Async interface to a hosted document database.
pub trait DocumentStore: Clone + 'static {
    /// Insert a new document and return its assigned id.
    fn create(
        &self,
        collection: &str,
        data: Document,
    ) -> impl Future<Output = Result<DocId, StoreError>>;

    /// Replace the managed fields of an existing document.
    fn update(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Remove a document by id.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<(), StoreError>>;

    /// Subscribe to every document in `collection` whose owner is `owner_id`.
    fn subscribe(&self, collection: &str, owner_id: &str) -> SnapshotStream;
}

/// A typed view over one collection of a [`DocumentStore`].
pub struct Collection<S, E> {
    store: S,
    _entity: PhantomData<fn() -> E>,
}

impl<S: Clone, E> Clone for Collection<S, E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<S: DocumentStore, E: Entity> Collection<S, E> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        E::COLLECTION
    }

    /// Create an entity owned by `owner_id`.
    pub async fn create(&self, owner_id: &str, fields: &E) -> Result<DocId, StoreError> {
        let data = encode(owner_id, fields)?;
        let id = self.store.create(E::COLLECTION, data).await?;
        tracing::info!(collection = E::COLLECTION, %id, "created document");
        Ok(id)
    }

    /// Overwrite every managed field of `entry`. The owner is written unchanged.
    pub async fn update(&self, entry: &Entry<E>) -> Result<(), StoreError> {
        let data = encode(&entry.owner_id, &entry.fields)?;
        self.store.update(E::COLLECTION, &entry.id, data).await?;
        tracing::info!(collection = E::COLLECTION, id = %entry.id, "updated document");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(E::COLLECTION, id).await?;
        tracing::info!(collection = E::COLLECTION, %id, "deleted document");
        Ok(())
    }

    /// Subscribe to the entries owned by `owner_id`.
    ///
    /// A document that fails to decode turns the whole snapshot into an error so a
    /// partially decoded list is never shown.
    pub fn subscribe(&self, owner_id: &str) -> EntryStream<E> {
        self.store
            .subscribe(E::COLLECTION, owner_id)
            .map(|snapshot| {
                snapshot.and_then(|docs| docs.iter().map(decode::<E>).collect())
            })
            .boxed_local()
    }
}
