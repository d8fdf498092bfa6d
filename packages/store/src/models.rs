//! # Domain models for the four tracked entity kinds
//!
//! Every entity is a flat set of fields owned by exactly one user. The store-assigned
//! id and the owner id are not part of the field structs; they travel alongside them
//! in an [`Entry`], so the same field struct doubles as the wizard's build output and
//! the edit form's write payload.
//!
//! ## Types
//!
//! | Struct | Collection | Fields |
//! |--------|-----------|--------|
//! | [`Appointment`] | `appointments` | type, purpose, start date, notes |
//! | [`MedicalRecord`] | `records` | type, purpose, start date, notes |
//! | [`Allergy`] | `allergies` | allergen, optional sub-type, severity, symptoms, creation time |
//! | [`IntakeLog`] | `logs` | intake type, specific intake, intake date, notes |
//!
//! Field names on the wire are camelCase (`startDate`, `subType`, ...) and the owner id
//! is stored under `uid`; see [`crate::document`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the store on creation.
pub type DocId = String;

/// Identifier of the authenticated user owning an entity.
pub type OwnerId = String;

/// A field struct that lives in a named collection.
pub trait Entity: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + 'static {
    /// Collection name in the document store.
    const COLLECTION: &'static str;

    /// Date used when a list is ordered newest first.
    fn timeline_date(&self) -> Option<NaiveDate> {
        None
    }
}

/// A stored entity together with its immutable id and owner.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<E> {
    pub id: DocId,
    pub owner_id: OwnerId,
    pub fields: E,
}

/// A scheduled visit to a practitioner.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl Entity for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn timeline_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
}

/// A diagnosis, prescription or other medical record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl Entity for MedicalRecord {
    const COLLECTION: &'static str = "records";

    fn timeline_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
}

/// How strongly an allergy presents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Extreme,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
        Severity::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
            Severity::Extreme => "Extreme",
        }
    }

    /// Parse a display label; unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A known allergy with its reaction profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allergy {
    #[serde(rename = "allergy", default)]
    pub allergen: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Allergy {
    const COLLECTION: &'static str = "allergies";

    fn timeline_date(&self) -> Option<NaiveDate> {
        Some(self.created_at.date_naive())
    }
}

/// What kind of thing was taken in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntakeType {
    #[default]
    Food,
    Drink,
    Cream,
    Supplement,
    Other,
}

impl IntakeType {
    pub const ALL: [IntakeType; 5] = [
        IntakeType::Food,
        IntakeType::Drink,
        IntakeType::Cream,
        IntakeType::Supplement,
        IntakeType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeType::Food => "Food",
            IntakeType::Drink => "Drink",
            IntakeType::Cream => "Cream",
            IntakeType::Supplement => "Supplement",
            IntakeType::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }
}

impl fmt::Display for IntakeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single food, drink, cream or supplement intake.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeLog {
    #[serde(default)]
    pub intake_type: IntakeType,
    #[serde(default)]
    pub specific_intake: String,
    #[serde(default)]
    pub intake_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl Entity for IntakeLog {
    const COLLECTION: &'static str = "logs";

    fn timeline_date(&self) -> Option<NaiveDate> {
        self.intake_date
    }
}

/// Every collection name the application reads or writes.
pub const COLLECTIONS: [&str; 4] = [
    Appointment::COLLECTION,
    MedicalRecord::COLLECTION,
    Allergy::COLLECTION,
    IntakeLog::COLLECTION,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_labels() {
        for s in Severity::ALL {
            assert_eq!(Severity::from_label(s.as_str()), Some(s));
        }
        assert_eq!(Severity::from_label("Unbearable"), None);
    }

    #[test]
    fn test_appointment_wire_names() {
        let appt = Appointment {
            kind: "Dentist".into(),
            purpose: "Cleaning".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            notes: String::new(),
        };
        let value = serde_json::to_value(&appt).unwrap();
        assert_eq!(value["type"], "Dentist");
        assert_eq!(value["startDate"], "2024-03-01");
    }

    #[test]
    fn test_legacy_allergy_without_severity() {
        let value = serde_json::json!({
            "allergy": "Pollen",
            "createdAt": "2024-01-02T03:04:05Z",
        });
        let allergy: Allergy = serde_json::from_value(value).unwrap();
        assert_eq!(allergy.allergen, "Pollen");
        assert!(allergy.severity.is_none());
        assert!(allergy.symptoms.is_empty());
        assert_eq!(allergy.timeline_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
    }
}
