pub mod config;
pub mod document;
pub mod error;
pub mod gateway;
pub mod models;

mod memory;
pub use memory::MemoryStore;

pub use config::{AppConfig, ListOrder};
pub use document::{Document, Snapshot, StoredDocument};
pub use error::StoreError;
pub use gateway::{Collection, DocumentStore, EntryStream, SnapshotStream};
pub use models::{
    Allergy, Appointment, DocId, Entity, Entry, IntakeLog, IntakeType, MedicalRecord, OwnerId,
    Severity, COLLECTIONS,
};
