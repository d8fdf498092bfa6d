//! # Owner-scoped document table
//!
//! Every entity lives in one `documents` table as a `jsonb` body tagged with its
//! collection name and owner:
//!
//! ```sql
//! documents(id uuid, collection text, owner_id uuid, data jsonb, created_at, updated_at)
//! ```
//!
//! All queries filter on `owner_id`, which is always the session user, never a value
//! taken from the request. The `uid` field inside the body must agree with it.
//! Updates merge the new body over the old one (`data || $new`), so every field the
//! client sends is overwritten and nothing else is touched.

use sqlx::types::Json;
use sqlx::PgPool;
use store::{Document, StoreError, StoredDocument, COLLECTIONS};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("document {0} not found")]
    NotFound(String),

    #[error("document owner does not match the signed-in user")]
    OwnerMismatch,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<DocumentError> for StoreError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::UnknownCollection(name) => StoreError::UnknownCollection(name),
            DocumentError::NotFound(id) => StoreError::NotFound(id),
            DocumentError::OwnerMismatch => StoreError::PermissionDenied,
            DocumentError::Database(e) => StoreError::Unavailable(e.to_string()),
        }
    }
}

fn check_collection(collection: &str) -> Result<(), DocumentError> {
    if COLLECTIONS.contains(&collection) {
        Ok(())
    } else {
        Err(DocumentError::UnknownCollection(collection.to_string()))
    }
}

fn check_owner(owner_id: Uuid, data: &Document) -> Result<(), DocumentError> {
    match store::document::owner_of(data) {
        Some(uid) if uid == owner_id.to_string() => Ok(()),
        _ => Err(DocumentError::OwnerMismatch),
    }
}

fn parse_id(id: &str) -> Result<Uuid, DocumentError> {
    Uuid::parse_str(id).map_err(|_| DocumentError::NotFound(id.to_string()))
}

pub async fn insert(
    pool: &PgPool,
    collection: &str,
    owner_id: Uuid,
    data: Document,
) -> Result<Uuid, DocumentError> {
    check_collection(collection)?;
    check_owner(owner_id, &data)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO documents (collection, owner_id, data)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(collection)
    .bind(owner_id)
    .bind(Json(data))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

pub async fn overwrite(
    pool: &PgPool,
    collection: &str,
    owner_id: Uuid,
    id: &str,
    data: Document,
) -> Result<(), DocumentError> {
    check_collection(collection)?;
    check_owner(owner_id, &data)?;
    let doc_id = parse_id(id)?;

    let result = sqlx::query(
        r#"
        UPDATE documents
        SET data = data || $4, updated_at = NOW()
        WHERE id = $1 AND collection = $2 AND owner_id = $3
        "#,
    )
    .bind(doc_id)
    .bind(collection)
    .bind(owner_id)
    .bind(Json(data))
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DocumentError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Delete by id. Deleting a missing document succeeds.
pub async fn remove(
    pool: &PgPool,
    collection: &str,
    owner_id: Uuid,
    id: &str,
) -> Result<(), DocumentError> {
    check_collection(collection)?;
    let Ok(doc_id) = Uuid::parse_str(id) else {
        return Ok(());
    };

    sqlx::query("DELETE FROM documents WHERE id = $1 AND collection = $2 AND owner_id = $3")
        .bind(doc_id)
        .bind(collection)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Every document the owner has in `collection`, oldest first.
pub async fn list(
    pool: &PgPool,
    collection: &str,
    owner_id: Uuid,
) -> Result<Vec<StoredDocument>, DocumentError> {
    check_collection(collection)?;

    let rows: Vec<(Uuid, Json<Document>)> = sqlx::query_as(
        r#"
        SELECT id, data FROM documents
        WHERE collection = $1 AND owner_id = $2
        ORDER BY created_at, id
        "#,
    )
    .bind(collection)
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, Json(data))| StoredDocument {
            id: id.to_string(),
            data,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_allow_list() {
        assert!(check_collection("allergies").is_ok());
        assert!(matches!(
            check_collection("users"),
            Err(DocumentError::UnknownCollection(name)) if name == "users"
        ));
    }

    #[test]
    fn test_owner_must_match_session() {
        let owner = Uuid::new_v4();
        let mut data = Document::new();
        assert!(matches!(check_owner(owner, &data), Err(DocumentError::OwnerMismatch)));

        data.insert("uid".into(), Uuid::new_v4().to_string().into());
        assert!(matches!(check_owner(owner, &data), Err(DocumentError::OwnerMismatch)));

        data.insert("uid".into(), owner.to_string().into());
        assert!(check_owner(owner, &data).is_ok());
    }

    #[test]
    fn test_maps_to_store_error() {
        assert_eq!(
            StoreError::from(DocumentError::OwnerMismatch),
            StoreError::PermissionDenied
        );
        assert_eq!(
            StoreError::from(DocumentError::NotFound("x".into())),
            StoreError::NotFound("x".into())
        );
    }
}
