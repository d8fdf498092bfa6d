//! Raw documents as the store sees them, and their typed encoding.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{DocId, Entity, Entry};

/// Field name carrying the owner id inside every document.
pub const OWNER_FIELD: &str = "uid";

/// A schemaless document body.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A document together with its store-assigned id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocId,
    pub data: Document,
}

impl StoredDocument {
    /// Owner id recorded in the document, if any.
    pub fn owner(&self) -> Option<&str> {
        owner_of(&self.data)
    }
}

/// The full current result set of a subscribed query.
pub type Snapshot = Vec<StoredDocument>;

pub fn owner_of(data: &Document) -> Option<&str> {
    data.get(OWNER_FIELD).and_then(|v| v.as_str())
}

/// Encode entity fields plus owner into a document body.
pub fn encode<E: Entity>(owner_id: &str, fields: &E) -> Result<Document, StoreError> {
    let mut data = match serde_json::to_value(fields)? {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(StoreError::Malformed(format!(
                "{} encodes to {other}, expected an object",
                E::COLLECTION
            )))
        }
    };
    data.insert(OWNER_FIELD.to_string(), owner_id.into());
    Ok(data)
}

/// Decode a stored document into a typed entry.
pub fn decode<E: Entity>(doc: &StoredDocument) -> Result<Entry<E>, StoreError> {
    let owner_id = doc
        .owner()
        .ok_or_else(|| StoreError::Malformed(format!("document {} has no owner", doc.id)))?
        .to_string();
    let fields: E = serde_json::from_value(serde_json::Value::Object(doc.data.clone()))?;
    Ok(Entry {
        id: doc.id.clone(),
        owner_id,
        fields,
    })
}
