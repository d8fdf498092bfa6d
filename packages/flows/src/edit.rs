//! Single-screen edit form with full-overwrite save.

use std::fmt::Debug;

use chrono::NaiveDate;
use store::{Collection, DocumentStore, Entity, Entry, StoreError};

/// One input on an edit form.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPrompt {
    pub key: &'static str,
    pub label: &'static str,
    pub input: FieldInput,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldInput {
    Text(String),
    Date(Option<NaiveDate>),
    /// A drop-down; an empty `value` means nothing is selected.
    Select {
        options: Vec<&'static str>,
        value: String,
        blank: Option<&'static str>,
    },
    Toggles {
        options: Vec<&'static str>,
        selected: Vec<String>,
    },
}

/// A change to one field of an edit form.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(Option<NaiveDate>),
    Toggle(String),
}

/// Per-kind configuration of the edit form.
pub trait Editable: Entity {
    type Form: Clone + Debug + PartialEq + 'static;

    fn seed(fields: &Self) -> Self::Form;

    fn fields(form: &Self::Form) -> Vec<FieldPrompt>;

    fn set(form: &mut Self::Form, key: &str, value: FieldValue);

    /// Every field the form owns, blank values mapped to their empty default.
    /// Fields the form does not own are carried over from `previous`.
    fn apply(form: &Self::Form, previous: &Self) -> Self;
}

/// State of the edit modal for one entity kind.
#[derive(Clone, Debug, PartialEq)]
pub struct EditModal<K: Editable> {
    selected: Option<Entry<K>>,
    form: Option<K::Form>,
    error: Option<StoreError>,
    saving: bool,
}

impl<K: Editable> Default for EditModal<K> {
    fn default() -> Self {
        Self {
            selected: None,
            form: None,
            error: None,
            saving: false,
        }
    }
}

impl<K: Editable> EditModal<K> {
    /// Open on `entry`, re-seeding the form even if it was already open.
    pub fn open(&mut self, entry: &Entry<K>) {
        self.form = Some(K::seed(&entry.fields));
        self.selected = Some(entry.clone());
        self.error = None;
        self.saving = false;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&Entry<K>> {
        self.selected.as_ref()
    }

    pub fn form(&self) -> Option<&K::Form> {
        self.form.as_ref()
    }

    pub fn fields(&self) -> Vec<FieldPrompt> {
        self.form.as_ref().map(K::fields).unwrap_or_default()
    }

    pub fn error(&self) -> Option<&StoreError> {
        self.error.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn set(&mut self, key: &str, value: FieldValue) {
        if let Some(form) = self.form.as_mut() {
            K::set(form, key, value);
        }
    }

    /// The entry to write: same id and owner, every owned field from the form.
    pub fn prepare_save(&mut self) -> Option<Entry<K>> {
        let selected = self.selected.as_ref()?;
        let form = self.form.as_ref()?;
        let entry = Entry {
            id: selected.id.clone(),
            owner_id: selected.owner_id.clone(),
            fields: K::apply(form, &selected.fields),
        };
        self.saving = true;
        self.error = None;
        Some(entry)
    }

    /// Close on success; stay open with the error on failure.
    pub fn finish_save(&mut self, result: Result<(), StoreError>) -> Result<(), StoreError> {
        self.saving = false;
        match result {
            Ok(()) => {
                self.close();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(collection = K::COLLECTION, error = %e, "edit save failed");
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn save<S: DocumentStore>(
        &mut self,
        collection: &Collection<S, K>,
    ) -> Result<(), StoreError> {
        let Some(entry) = self.prepare_save() else {
            return Ok(());
        };
        let result = collection.update(&entry).await;
        self.finish_save(result)
    }
}

/// `Some(text)` unless blank.
pub(crate) fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Flip membership of `value`, keeping selection order.
pub(crate) fn toggle(selected: &mut Vec<String>, value: String) {
    if let Some(pos) = selected.iter().position(|s| *s == value) {
        selected.remove(pos);
    } else {
        selected.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use store::{MedicalRecord, MemoryStore};

    #[tokio::test]
    async fn test_failed_save_stays_open_with_error() {
        let store = MemoryStore::new();
        let records = Collection::<_, MedicalRecord>::new(store.clone());
        let fields = MedicalRecord {
            kind: "Diagnosis".into(),
            purpose: "Flu".into(),
            ..Default::default()
        };
        records.create("alice", &fields).await.unwrap();
        let entry = records
            .subscribe("alice")
            .next()
            .await
            .unwrap()
            .unwrap()
            .remove(0);

        let mut modal = EditModal::default();
        modal.open(&entry);
        modal.set("purpose", FieldValue::Text("Migraine".into()));

        store.set_offline(true);
        let err = modal.save(&records).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(modal.is_open());
        assert!(!modal.is_saving());
        assert_eq!(modal.error(), Some(&err));
        assert_eq!(modal.selected(), Some(&entry));

        store.set_offline(false);
        modal.save(&records).await.unwrap();
        assert!(!modal.is_open());
        assert!(modal.error().is_none());

        let saved = records
            .subscribe("alice")
            .next()
            .await
            .unwrap()
            .unwrap()
            .remove(0);
        assert_eq!(saved.fields.purpose, "Migraine");
    }
}
