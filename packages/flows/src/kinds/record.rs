use chrono::{DateTime, NaiveDate, Utc};
use store::MedicalRecord;

use crate::edit::{Editable, FieldPrompt, FieldValue};
use crate::error::ValidationError;
use crate::wizard::{Answer, StepPrompt, WizardKind};

use super::visit::{self, Visit, VisitDraft, VisitForm, VisitParts, VisitStep, Vocabulary};
use super::{display_date, lookup, Presentable};

pub const TYPES: &[&str] = &["Diagnosis", "Prescription", "Other"];

pub const PURPOSES: &[(&str, &[&str])] = &[
    (
        "Diagnosis",
        &["Cold", "Migraine", "Flu", "COVID-19", "Stomach Ache", "Headache", "Back Pain"],
    ),
    ("Prescription", &["Ibuprofen", "Paracetamol", "Aspirin", "Penicillin"]),
];

const EMOJIS: &[(&str, &str)] = &[("Diagnosis", "📝"), ("Prescription", "💊")];

const ACCENTS: &[(&str, &str)] = &[
    ("Diagnosis", "bg-blue-100"),
    ("Prescription", "bg-green-100"),
    ("Other", "bg-gray-100"),
];

impl Visit for MedicalRecord {
    const VOCABULARY: Vocabulary = Vocabulary {
        noun: "record",
        type_field: "a record type",
        types: TYPES,
        default_type: "Diagnosis",
        purposes: PURPOSES,
    };

    fn assemble(
        kind: String,
        purpose: String,
        start_date: Option<NaiveDate>,
        notes: String,
    ) -> Self {
        MedicalRecord {
            kind,
            purpose,
            start_date,
            notes,
        }
    }

    fn parts(&self) -> VisitParts<'_> {
        VisitParts {
            kind: &self.kind,
            purpose: &self.purpose,
            start_date: self.start_date,
            notes: &self.notes,
        }
    }
}

impl WizardKind for MedicalRecord {
    type Draft = VisitDraft<MedicalRecord>;
    type Step = VisitStep;

    fn applicable_steps(_draft: &Self::Draft) -> Vec<VisitStep> {
        visit::applicable_steps()
    }

    fn prompt(step: VisitStep, draft: &Self::Draft) -> StepPrompt {
        visit::prompt(step, draft)
    }

    fn answer(step: VisitStep, draft: &mut Self::Draft, answer: Answer) {
        visit::answer(step, draft, answer)
    }

    fn validate(step: VisitStep, draft: &Self::Draft) -> Result<(), ValidationError> {
        visit::validate(step, draft)
    }

    fn build(draft: &Self::Draft, _now: DateTime<Utc>) -> Self {
        visit::build(draft)
    }
}

impl Editable for MedicalRecord {
    type Form = VisitForm;

    fn seed(fields: &Self) -> VisitForm {
        visit::seed(fields)
    }

    fn fields(form: &VisitForm) -> Vec<FieldPrompt> {
        visit::fields(form)
    }

    fn set(form: &mut VisitForm, key: &str, value: FieldValue) {
        visit::set(form, key, value)
    }

    fn apply(form: &VisitForm, _previous: &Self) -> Self {
        visit::apply(form)
    }
}

impl Presentable for MedicalRecord {
    const TITLE: &'static str = "My Medical Records";
    const NOUN: &'static str = "Record";
    const EMPTY: &'static str = "No records added yet.";

    fn emoji(&self) -> &'static str {
        lookup(EMOJIS, &self.kind, "📋")
    }

    fn accent(&self) -> &'static str {
        lookup(ACCENTS, &self.kind, "bg-blue-50")
    }

    fn headline(&self) -> String {
        self.kind.clone()
    }

    fn details(&self) -> Vec<String> {
        vec![self.purpose.clone(), display_date(self.start_date)]
    }

    fn notes(&self) -> Option<&str> {
        (!self.notes.is_empty()).then_some(self.notes.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditModal;
    use crate::kinds::testing::{assert_symmetric, pick, pick_next};
    use crate::wizard::Wizard;
    use futures::StreamExt;
    use store::{Collection, MemoryStore};

    #[test]
    fn test_defaults_to_diagnosis() {
        let wizard = Wizard::<MedicalRecord>::new();
        assert_eq!(wizard.draft().kind.selected(), Some("Diagnosis"));
        match wizard.prompt() {
            StepPrompt::Pick { options, .. } => assert_eq!(options, TYPES),
            other => panic!("unexpected prompt {other:?}"),
        }
    }

    #[test]
    fn test_prescription_purposes() {
        let mut wizard = Wizard::<MedicalRecord>::new();
        pick_next(&mut wizard, "Prescription");
        match wizard.prompt() {
            StepPrompt::Pick { title, options, .. } => {
                assert_eq!(title, "Prescription Purpose");
                assert!(options.contains(&"Paracetamol"));
            }
            other => panic!("unexpected prompt {other:?}"),
        }
    }

    #[test]
    fn test_submit_requires_owner() {
        let mut wizard = Wizard::<MedicalRecord>::new();
        pick_next(&mut wizard, "Diagnosis");
        pick_next(&mut wizard, "Flu");
        let err = wizard.prepare_submit(None, Utc::now()).unwrap_err();
        assert_eq!(err, crate::error::WizardError::NotSignedIn);
        assert!(!wizard.is_submitting());

        let (owner, record) = wizard.prepare_submit(Some("alice"), Utc::now()).unwrap();
        assert_eq!(owner, "alice");
        assert_eq!(record.purpose, "Flu");
        assert!(wizard.is_submitting());
    }

    #[test]
    fn test_submit_only_on_last_step() {
        let mut wizard = Wizard::<MedicalRecord>::new();
        pick(&mut wizard, "Diagnosis");
        let err = wizard.prepare_submit(Some("alice"), Utc::now()).unwrap_err();
        assert_eq!(err, crate::error::WizardError::NotAtLastStep);
    }

    #[test]
    fn test_unknown_type_uses_default_emoji() {
        let record = MedicalRecord {
            kind: "Other".into(),
            ..Default::default()
        };
        assert_eq!(record.emoji(), "📋");
        assert_eq!(record.accent(), "bg-gray-100");
    }

    #[test]
    fn test_next_previous_symmetry() {
        let mut wizard = Wizard::<MedicalRecord>::new();
        pick_next(&mut wizard, "Diagnosis");
        pick(&mut wizard, "Migraine");
        wizard.next().unwrap();
        assert_eq!(wizard.step(), VisitStep::Date);
        wizard.previous();
        wizard.previous();
        assert_symmetric(&mut wizard);
    }

    #[tokio::test]
    async fn test_preset_only_round_trip() {
        let store = MemoryStore::new();
        let records = Collection::<_, MedicalRecord>::new(store.clone());
        let mut wizard = Wizard::<MedicalRecord>::new();
        pick_next(&mut wizard, "Prescription");
        pick_next(&mut wizard, "Penicillin");
        let date = NaiveDate::from_ymd_opt(2023, 11, 2);
        wizard.answer(Answer::Date(date));
        wizard.submit(&records, Some("alice"), Utc::now()).await.unwrap();
        assert_eq!(wizard, Wizard::new());

        let entries = records.subscribe("alice").next().await.unwrap().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].owner_id, "alice");
        assert_eq!(
            entries[0].fields,
            MedicalRecord {
                kind: "Prescription".into(),
                purpose: "Penicillin".into(),
                start_date: date,
                notes: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_blanked_edit_overwrites() {
        let store = MemoryStore::new();
        let records = Collection::<_, MedicalRecord>::new(store.clone());
        let original = MedicalRecord {
            kind: "Diagnosis".into(),
            purpose: "Flu".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 9),
            notes: "Rest for a week".into(),
        };
        records.create("alice", &original).await.unwrap();
        let mut live = records.subscribe("alice");
        let entry = live.next().await.unwrap().unwrap().remove(0);

        let mut modal = EditModal::default();
        modal.open(&entry);
        modal.set("purpose", FieldValue::Text(String::new()));
        modal.set("notes", FieldValue::Text(String::new()));
        modal.set("startDate", FieldValue::Date(None));
        modal.save(&records).await.unwrap();
        assert!(!modal.is_open());

        let saved = live.next().await.unwrap().unwrap().remove(0);
        assert_eq!(saved.id, entry.id);
        assert_eq!(saved.owner_id, "alice");
        assert_eq!(
            saved.fields,
            MedicalRecord {
                kind: "Diagnosis".into(),
                purpose: String::new(),
                start_date: None,
                notes: String::new(),
            }
        );
    }
}
