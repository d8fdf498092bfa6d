use chrono::{DateTime, NaiveDate, Utc};
use store::Appointment;

use crate::edit::{Editable, FieldPrompt, FieldValue};
use crate::error::ValidationError;
use crate::wizard::{Answer, StepPrompt, WizardKind};

use super::visit::{self, Visit, VisitDraft, VisitForm, VisitParts, VisitStep, Vocabulary};
use super::{display_date, lookup, Presentable};

pub const TYPES: &[&str] = &[
    "Family Doctor",
    "Dentist",
    "Gynecologist",
    "Dermatologist",
    "Cardiologist",
    "Other",
];

pub const PURPOSES: &[(&str, &[&str])] = &[
    (
        "Family Doctor",
        &["Checkup", "Vaccination", "Consultation", "Follow-up", "Prescription", "Screening"],
    ),
    (
        "Dentist",
        &["Checkup", "Cleaning", "Filling", "Extraction", "Whitening", "Braces"],
    ),
    (
        "Gynecologist",
        &["Checkup", "Pregnancy", "Ultrasound", "Contraception", "Screening", "Menopause"],
    ),
    (
        "Dermatologist",
        &["Checkup", "Screening", "Acne", "Eczema", "Moles", "Rashes"],
    ),
    (
        "Cardiologist",
        &["Checkup", "Stress Test", "Echocardiogram", "ECG", "Screening", "Consultation"],
    ),
];

const EMOJIS: &[(&str, &str)] = &[
    ("Family Doctor", "👨‍⚕️"),
    ("Dentist", "🦷"),
    ("Gynecologist", "👩‍⚕️"),
    ("Dermatologist", "🩺"),
    ("Cardiologist", "❤️"),
    ("Other", "📅"),
];

const ACCENTS: &[(&str, &str)] = &[
    ("Family Doctor", "bg-blue-100"),
    ("Dentist", "bg-white"),
    ("Gynecologist", "bg-pink-100"),
    ("Dermatologist", "bg-green-100"),
    ("Cardiologist", "bg-red-100"),
    ("Other", "bg-gray-100"),
];

impl Visit for Appointment {
    const VOCABULARY: Vocabulary = Vocabulary {
        noun: "appointment",
        type_field: "an appointment type",
        types: TYPES,
        default_type: "Family Doctor",
        purposes: PURPOSES,
    };

    fn assemble(
        kind: String,
        purpose: String,
        start_date: Option<NaiveDate>,
        notes: String,
    ) -> Self {
        Appointment {
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

impl WizardKind for Appointment {
    type Draft = VisitDraft<Appointment>;
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

impl Editable for Appointment {
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

impl Presentable for Appointment {
    const TITLE: &'static str = "My Appointments";
    const NOUN: &'static str = "Appointment";
    const EMPTY: &'static str = "No appointments added yet.";

    fn emoji(&self) -> &'static str {
        lookup(EMOJIS, &self.kind, "📅")
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
    fn test_defaults_to_family_doctor() {
        let wizard = Wizard::<Appointment>::new();
        assert_eq!(wizard.draft().kind.selected(), Some("Family Doctor"));
        assert_eq!(wizard.total(), 3);
    }

    #[test]
    fn test_changing_type_clears_purpose() {
        let mut wizard = Wizard::<Appointment>::new();
        pick_next(&mut wizard, "Dentist");
        pick(&mut wizard, "Cleaning");
        wizard.previous();
        pick(&mut wizard, "Cardiologist");
        assert!(wizard.draft().purpose.is_empty());
        assert_eq!(wizard.step(), VisitStep::Type);

        wizard.next().unwrap();
        let err = wizard.next().unwrap_err();
        assert_eq!(err.to_string(), "Please select or enter a purpose.");
    }

    #[test]
    fn test_other_type_is_custom_only() {
        let mut wizard = Wizard::<Appointment>::new();
        pick_next(&mut wizard, "Other");
        match wizard.prompt() {
            StepPrompt::Pick { options, custom, .. } => {
                assert!(options.is_empty());
                assert!(custom.is_some());
            }
            other => panic!("unexpected prompt {other:?}"),
        }
        wizard.answer(Answer::Custom("Physiotherapy".into()));
        wizard.next().unwrap();
        assert!(wizard.is_last());
    }

    #[test]
    fn test_next_previous_symmetry() {
        let mut wizard = Wizard::<Appointment>::new();
        pick(&mut wizard, "Dentist");
        wizard.next().unwrap();
        pick(&mut wizard, "Braces");
        wizard.previous();
        assert_symmetric(&mut wizard);
    }

    #[tokio::test]
    async fn test_preset_only_round_trip() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());
        let mut wizard = Wizard::<Appointment>::new();
        pick_next(&mut wizard, "Dentist");
        pick_next(&mut wizard, "Cleaning");
        let date = NaiveDate::from_ymd_opt(2024, 5, 20);
        wizard.answer(Answer::Date(date));
        wizard.submit(&appointments, Some("alice"), Utc::now()).await.unwrap();
        assert_eq!(wizard, Wizard::new());

        let entries = appointments.subscribe("alice").next().await.unwrap().unwrap();
        assert_eq!(
            entries[0].fields,
            Appointment {
                kind: "Dentist".into(),
                purpose: "Cleaning".into(),
                start_date: date,
                notes: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_blanked_edit_overwrites() {
        let store = MemoryStore::new();
        let appointments = Collection::<_, Appointment>::new(store.clone());
        let original = Appointment {
            kind: "Dentist".into(),
            purpose: "Cleaning".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 20),
            notes: "Bring x-rays".into(),
        };
        appointments.create("alice", &original).await.unwrap();
        let mut live = appointments.subscribe("alice");
        let entry = live.next().await.unwrap().unwrap().remove(0);

        let mut modal = EditModal::default();
        modal.open(&entry);
        modal.set("notes", FieldValue::Text("  ".into()));
        modal.set("startDate", FieldValue::Date(None));
        modal.save(&appointments).await.unwrap();
        assert!(!modal.is_open());

        let saved = live.next().await.unwrap().unwrap().remove(0);
        assert_eq!(saved.id, entry.id);
        assert_eq!(saved.fields.notes, "");
        assert_eq!(saved.fields.start_date, None);
        assert_eq!(saved.fields.purpose, "Cleaning");
    }

    #[test]
    fn test_presentation() {
        let appt = Appointment {
            kind: "Chiropractor".into(),
            ..Default::default()
        };
        assert_eq!(appt.emoji(), "📅");
        assert_eq!(appt.accent(), "bg-blue-50");
        assert_eq!(appt.notes(), None);
        assert_eq!(appt.details()[1], "No Date Set");
    }
}
