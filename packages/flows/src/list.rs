//! Owner-scoped live lists.
//!
//! [`EntityList`] is the plain state a list view renders: the signed-in owner, the
//! entries of the latest snapshot and a status. [`LiveList`] pairs it with the
//! subscription stream that feeds it, so switching owners drops the previous stream
//! before the next one is opened.
//!
//! Every rescope bumps a generation counter. Snapshots are applied together with the
//! generation they were requested under, and a snapshot from an older generation is
//! discarded, so a late delivery for a previous user can never reach the view.

use futures::StreamExt;
use store::{
    Collection, DocumentStore, Entity, Entry, EntryStream, ListOrder, OwnerId, StoreError,
};

#[derive(Clone, Debug, PartialEq)]
pub enum ListStatus {
    SignedOut,
    Loading,
    Live,
    /// The last delivery failed. Entries from the previous snapshot are kept.
    Failed(StoreError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityList<E> {
    owner: Option<OwnerId>,
    entries: Vec<Entry<E>>,
    status: ListStatus,
    order: ListOrder,
    generation: u64,
}

impl<E> Default for EntityList<E> {
    fn default() -> Self {
        Self {
            owner: None,
            entries: Vec::new(),
            status: ListStatus::SignedOut,
            order: ListOrder::default(),
            generation: 0,
        }
    }
}

impl<E: Entity> EntityList<E> {
    pub fn new(order: ListOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn entries(&self) -> &[Entry<E>] {
        &self.entries
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as seen by `viewer`. Empty unless the list is scoped to that owner.
    pub fn entries_for(&self, viewer: Option<&str>) -> &[Entry<E>] {
        if self.owner.as_deref() == viewer {
            &self.entries
        } else {
            &[]
        }
    }

    /// Status as seen by `viewer`. A list still scoped to someone else reads as
    /// loading until it is rescoped.
    pub fn status_for(&self, viewer: Option<&str>) -> ListStatus {
        match viewer {
            _ if self.owner.as_deref() == viewer => self.status.clone(),
            Some(_) => ListStatus::Loading,
            None => ListStatus::SignedOut,
        }
    }

    /// Switch to `owner`, clearing entries. Returns whether anything changed.
    pub fn rescope(&mut self, owner: Option<&str>) -> bool {
        if self.owner.as_deref() == owner {
            return false;
        }
        self.owner = owner.map(str::to_string);
        self.entries.clear();
        self.generation += 1;
        self.status = if self.owner.is_some() {
            ListStatus::Loading
        } else {
            ListStatus::SignedOut
        };
        true
    }

    /// Restart delivery for the same owner. Entries stay visible meanwhile.
    pub fn restart(&mut self) -> u64 {
        self.generation += 1;
        if self.owner.is_some() && self.entries.is_empty() {
            self.status = ListStatus::Loading;
        }
        self.generation
    }

    /// Apply a delivery produced under `generation`. Returns false if it was stale.
    pub fn apply(&mut self, generation: u64, result: Result<Vec<Entry<E>>, StoreError>) -> bool {
        if generation != self.generation {
            tracing::debug!(collection = E::COLLECTION, generation, "discarded stale snapshot");
            return false;
        }
        let Some(owner) = self.owner.as_deref() else {
            return false;
        };
        match result {
            Ok(entries) => {
                let mut entries: Vec<_> =
                    entries.into_iter().filter(|e| e.owner_id == owner).collect();
                sort_entries(&mut entries, self.order);
                self.entries = entries;
                self.status = ListStatus::Live;
            }
            Err(e) => {
                tracing::warn!(
                    collection = E::COLLECTION,
                    error = %e,
                    "subscription delivery failed"
                );
                self.status = ListStatus::Failed(e);
            }
        }
        true
    }
}

fn sort_entries<E: Entity>(entries: &mut [Entry<E>], order: ListOrder) {
    if order == ListOrder::NewestFirst {
        // Stable: undated entries go last, ties keep store order.
        entries.sort_by(|a, b| {
            match (a.fields.timeline_date(), b.fields.timeline_date()) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }
}

/// An [`EntityList`] fed by a live subscription.
pub struct LiveList<S, E> {
    collection: Collection<S, E>,
    list: EntityList<E>,
    stream: Option<EntryStream<E>>,
}

impl<S: DocumentStore, E: Entity> LiveList<S, E> {
    pub fn new(collection: Collection<S, E>, order: ListOrder) -> Self {
        Self {
            collection,
            list: EntityList::new(order),
            stream: None,
        }
    }

    pub fn list(&self) -> &EntityList<E> {
        &self.list
    }

    pub fn is_subscribed(&self) -> bool {
        self.stream.is_some()
    }

    /// Follow `owner`, cancelling the previous subscription first.
    pub fn set_owner(&mut self, owner: Option<&str>) {
        if !self.list.rescope(owner) {
            return;
        }
        self.stream = None;
        self.stream = owner.map(|owner| self.collection.subscribe(owner));
    }

    /// Re-open the subscription for the current owner.
    pub fn retry(&mut self) {
        self.stream = None;
        self.list.restart();
        self.stream = self.list.owner().map(|owner| self.collection.subscribe(owner));
    }

    /// Wait for the next delivery and apply it. Returns false once there is nothing to wait for.
    pub async fn next(&mut self) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };
        let generation = self.list.generation();
        match stream.next().await {
            Some(result) => {
                self.list.apply(generation, result);
                true
            }
            None => {
                self.stream = None;
                false
            }
        }
    }
}
