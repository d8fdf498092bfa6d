//! Allergy wizard: allergen, an optional sub-type, severity and symptoms.
//!
//! The sub-type step exists only for allergens listed in [`SUB_TYPES`]; changing the
//! allergen drops any sub-type already chosen.

use chrono::{DateTime, Utc};
use store::{Allergy, Severity};

use crate::choice::Choice;
use crate::edit::{non_blank, toggle, Editable, FieldInput, FieldPrompt, FieldValue};
use crate::error::ValidationError;
use crate::wizard::{Answer, CustomInput, StepPrompt, WizardKind};

use super::{apply_choice, lookup, options_for, Presentable};

pub const ALLERGENS: &[&str] = &[
    "Pollen",
    "Peanuts",
    "Fish Products",
    "Pet Dander",
    "Insect Stings",
    "Medication",
];

pub const SUB_TYPES: &[(&str, &[&str])] = &[
    ("Pet Dander", &["Cat", "Dog", "Bird", "Other"]),
    ("Medication", &["Ibuprofen", "Penicillin", "Aspirin", "Other"]),
    ("Insect Stings", &["Bee", "Wasp", "Hornet", "Other"]),
];

pub const SYMPTOMS: &[&str] = &[
    "Sneezing",
    "Itchy Eyes",
    "Runny Nose",
    "Cough",
    "Difficulty Breathing",
    "Hives",
    "Swelling",
    "Anaphylaxis",
];

const EMOJIS: &[(&str, &str)] = &[
    ("Pollen", "🌼"),
    ("Dust", "🌫️"),
    ("Peanuts", "🥜"),
    ("Fish Products", "🐟"),
    ("Pet Dander", "🐾"),
    ("Insect Stings", "🐝"),
    ("Medication", "💊"),
    ("Other", "📋"),
];

const ACCENTS: &[(&str, &str)] = &[
    ("Pollen", "bg-blue-100"),
    ("Dust", "bg-gray-100"),
    ("Peanuts", "bg-yellow-100"),
    ("Fish Products", "bg-teal-100"),
    ("Pet Dander", "bg-pink-100"),
    ("Insect Stings", "bg-orange-100"),
    ("Medication", "bg-green-100"),
    ("Other", "bg-purple-100"),
];

fn severity_labels() -> Vec<&'static str> {
    Severity::ALL.iter().map(Severity::as_str).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllergyStep {
    Allergen,
    SubType,
    Severity,
    Symptoms,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AllergyDraft {
    pub allergen: Choice,
    pub sub_type: Choice,
    pub severity: Option<Severity>,
    pub symptoms: Vec<String>,
}

impl AllergyDraft {
    /// Sub-types offered for the chosen allergen; empty when the step does not apply.
    pub fn sub_types(&self) -> &'static [&'static str] {
        self.allergen
            .value()
            .map(|allergen| options_for(SUB_TYPES, &allergen))
            .unwrap_or(&[])
    }

    pub fn requires_sub_type(&self) -> bool {
        !self.sub_types().is_empty()
    }
}

impl WizardKind for Allergy {
    type Draft = AllergyDraft;
    type Step = AllergyStep;

    fn applicable_steps(draft: &AllergyDraft) -> Vec<AllergyStep> {
        let mut steps = vec![AllergyStep::Allergen];
        if draft.requires_sub_type() {
            steps.push(AllergyStep::SubType);
        }
        steps.extend([AllergyStep::Severity, AllergyStep::Symptoms]);
        steps
    }

    fn prompt(step: AllergyStep, draft: &AllergyDraft) -> StepPrompt {
        match step {
            AllergyStep::Allergen => StepPrompt::Pick {
                title: "Select Allergy".into(),
                options: ALLERGENS.to_vec(),
                selected: draft.allergen.selected().map(str::to_string),
                custom: Some(CustomInput {
                    placeholder: "Or enter a custom allergy",
                    value: draft.allergen.custom().to_string(),
                }),
            },
            AllergyStep::SubType => StepPrompt::Pick {
                title: format!("Select {} Type", draft.allergen.value().unwrap_or_default()),
                options: draft.sub_types().to_vec(),
                selected: draft.sub_type.selected().map(str::to_string),
                custom: Some(CustomInput {
                    placeholder: "Or enter a custom sub-type",
                    value: draft.sub_type.custom().to_string(),
                }),
            },
            AllergyStep::Severity => StepPrompt::Pick {
                title: "Select Severity".into(),
                options: severity_labels(),
                selected: draft.severity.map(|s| s.as_str().to_string()),
                custom: None,
            },
            AllergyStep::Symptoms => StepPrompt::Toggle {
                title: "Select Symptoms".into(),
                options: SYMPTOMS.to_vec(),
                selected: draft.symptoms.clone(),
            },
        }
    }

    fn answer(step: AllergyStep, draft: &mut AllergyDraft, answer: Answer) {
        match (step, answer) {
            (AllergyStep::Allergen, answer) => {
                if apply_choice(&mut draft.allergen, answer) {
                    draft.sub_type.clear();
                }
            }
            (AllergyStep::SubType, answer) => {
                apply_choice(&mut draft.sub_type, answer);
            }
            (AllergyStep::Severity, Answer::Pick(label)) => {
                draft.severity = Severity::from_label(&label);
            }
            (AllergyStep::Symptoms, Answer::Toggle(symptom)) => {
                toggle(&mut draft.symptoms, symptom)
            }
            (step, answer) => tracing::debug!(?step, ?answer, "ignored answer"),
        }
    }

    fn validate(step: AllergyStep, draft: &AllergyDraft) -> Result<(), ValidationError> {
        match step {
            AllergyStep::Allergen if draft.allergen.is_empty() => {
                Err(ValidationError::missing("an allergy"))
            }
            AllergyStep::SubType if draft.sub_type.is_empty() => {
                Err(ValidationError::missing("a sub-type"))
            }
            AllergyStep::Severity if draft.severity.is_none() => {
                Err(ValidationError::missing("a severity"))
            }
            _ => Ok(()),
        }
    }

    fn build(draft: &AllergyDraft, now: DateTime<Utc>) -> Self {
        Allergy {
            allergen: draft.allergen.value().unwrap_or_default(),
            sub_type: if draft.requires_sub_type() {
                draft.sub_type.value()
            } else {
                None
            },
            severity: draft.severity,
            symptoms: draft.symptoms.clone(),
            created_at: now,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AllergyForm {
    pub allergen: String,
    pub sub_type: String,
    /// Severity label, empty when unset.
    pub severity: String,
    pub symptoms: Vec<String>,
}

impl Editable for Allergy {
    type Form = AllergyForm;

    fn seed(fields: &Self) -> AllergyForm {
        AllergyForm {
            allergen: fields.allergen.clone(),
            sub_type: fields.sub_type.clone().unwrap_or_default(),
            severity: fields.severity.map(|s| s.as_str().to_string()).unwrap_or_default(),
            symptoms: fields.symptoms.clone(),
        }
    }

    fn fields(form: &AllergyForm) -> Vec<FieldPrompt> {
        vec![
            FieldPrompt {
                key: "allergy",
                label: "Allergy",
                input: FieldInput::Text(form.allergen.clone()),
            },
            FieldPrompt {
                key: "subType",
                label: "Sub-Type",
                input: FieldInput::Text(form.sub_type.clone()),
            },
            FieldPrompt {
                key: "severity",
                label: "Severity",
                input: FieldInput::Select {
                    options: severity_labels(),
                    value: form.severity.clone(),
                    blank: Some("Select Severity"),
                },
            },
            FieldPrompt {
                key: "symptoms",
                label: "Symptoms",
                input: FieldInput::Toggles {
                    options: SYMPTOMS.to_vec(),
                    selected: form.symptoms.clone(),
                },
            },
        ]
    }

    fn set(form: &mut AllergyForm, key: &str, value: FieldValue) {
        match (key, value) {
            ("allergy", FieldValue::Text(text)) => form.allergen = text,
            ("subType", FieldValue::Text(text)) => form.sub_type = text,
            ("severity", FieldValue::Text(text)) => form.severity = text,
            ("symptoms", FieldValue::Toggle(symptom)) => toggle(&mut form.symptoms, symptom),
            (key, value) => tracing::debug!(key, ?value, "ignored edit for unknown field"),
        }
    }

    fn apply(form: &AllergyForm, previous: &Self) -> Self {
        Allergy {
            allergen: form.allergen.trim().to_string(),
            sub_type: non_blank(&form.sub_type),
            severity: Severity::from_label(form.severity.trim()),
            symptoms: form.symptoms.clone(),
            created_at: previous.created_at,
        }
    }
}

impl Presentable for Allergy {
    const TITLE: &'static str = "My Allergies";
    const NOUN: &'static str = "Allergy";
    const EMPTY: &'static str = "No allergies added yet.";

    fn emoji(&self) -> &'static str {
        lookup(EMOJIS, &self.allergen, "📋")
    }

    fn accent(&self) -> &'static str {
        lookup(ACCENTS, &self.allergen, "bg-blue-50")
    }

    fn headline(&self) -> String {
        self.allergen.clone()
    }

    fn details(&self) -> Vec<String> {
        let mut details = Vec::new();
        if let Some(sub_type) = &self.sub_type {
            details.push(sub_type.clone());
        }
        let severity = self.severity.map(|s| s.as_str()).unwrap_or("Not set");
        details.push(format!("Severity: {severity}"));
        if !self.symptoms.is_empty() {
            details.push(format!("Symptoms: {}", self.symptoms.join(", ")));
        }
        details
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

    #[tokio::test]
    async fn test_medication_scenario() {
        let store = MemoryStore::new();
        let allergies = Collection::<_, Allergy>::new(store.clone());
        let mut wizard = Wizard::<Allergy>::new();

        pick(&mut wizard, "Medication");
        assert_eq!(wizard.total(), 4);
        wizard.next().unwrap();
        pick_next(&mut wizard, "Aspirin");
        pick_next(&mut wizard, "Severe");
        wizard.answer(Answer::Toggle("Hives".into()));
        wizard.answer(Answer::Toggle("Swelling".into()));
        assert!(wizard.is_last());

        let now = Utc::now();
        wizard.submit(&allergies, Some("alice"), now).await.unwrap();

        let entries = allergies.subscribe("alice").next().await.unwrap().unwrap();
        assert_eq!(
            entries[0].fields,
            Allergy {
                allergen: "Medication".into(),
                sub_type: Some("Aspirin".into()),
                severity: Some(Severity::Severe),
                symptoms: vec!["Hives".into(), "Swelling".into()],
                created_at: now,
            }
        );
        assert_eq!(entries[0].owner_id, "alice");
    }

    #[test]
    fn test_allergen_without_sub_types_has_three_steps() {
        let mut wizard = Wizard::<Allergy>::new();
        pick(&mut wizard, "Pollen");
        assert_eq!(wizard.total(), 3);
        wizard.next().unwrap();
        assert_eq!(wizard.step(), AllergyStep::Severity);
    }

    #[test]
    fn test_changing_allergen_clears_sub_type() {
        let mut wizard = Wizard::<Allergy>::new();
        pick_next(&mut wizard, "Pet Dander");
        assert_eq!(wizard.step(), AllergyStep::SubType);
        pick(&mut wizard, "Cat");
        wizard.previous();

        pick(&mut wizard, "Peanuts");
        assert!(wizard.draft().sub_type.is_empty());
        assert_eq!(wizard.total(), 3);
        assert_eq!(wizard.step(), AllergyStep::Allergen);

        wizard.next().unwrap();
        assert_eq!(wizard.step(), AllergyStep::Severity);
        pick_next(&mut wizard, "Mild");
        let allergy = Allergy::build(wizard.draft(), Utc::now());
        assert_eq!(allergy.sub_type, None);
    }

    #[test]
    fn test_reselecting_same_allergen_keeps_sub_type() {
        let mut wizard = Wizard::<Allergy>::new();
        pick_next(&mut wizard, "Insect Stings");
        pick(&mut wizard, "Wasp");
        wizard.previous();
        pick(&mut wizard, "Insect Stings");
        assert_eq!(wizard.draft().sub_type.value().as_deref(), Some("Wasp"));
    }

    #[test]
    fn test_next_previous_symmetry_for_every_allergen() {
        for allergen in ALLERGENS {
            let mut wizard = Wizard::<Allergy>::new();
            pick(&mut wizard, allergen);
            if wizard.draft().requires_sub_type() {
                wizard.next().unwrap();
                pick(&mut wizard, "Other");
            }
            while wizard.step() != AllergyStep::Severity {
                wizard.next().unwrap();
            }
            pick(&mut wizard, "Moderate");
            while !wizard.is_first() {
                wizard.previous();
            }
            assert_symmetric(&mut wizard);
        }
    }

    #[test]
    fn test_missing_severity_blocks_next() {
        let mut wizard = Wizard::<Allergy>::new();
        pick_next(&mut wizard, "Pollen");
        let err = wizard.next().unwrap_err();
        assert_eq!(err.to_string(), "Please select or enter a severity.");
        assert_eq!(wizard.step(), AllergyStep::Severity);
        assert!(wizard.error().is_some());
    }

    #[test]
    fn test_custom_allergen() {
        let mut wizard = Wizard::<Allergy>::new();
        wizard.answer(Answer::Custom("Latex".into()));
        assert_eq!(wizard.total(), 3);
        wizard.next().unwrap();
        pick_next(&mut wizard, "Extreme");
        let allergy = Allergy::build(wizard.draft(), Utc::now());
        assert_eq!(allergy.allergen, "Latex");
    }

    #[tokio::test]
    async fn test_edit_clears_severity_and_keeps_created_at() {
        let store = MemoryStore::new();
        let allergies = Collection::<_, Allergy>::new(store.clone());
        let created_at = Utc::now();
        let original = Allergy {
            allergen: "Pet Dander".into(),
            sub_type: Some("Dog".into()),
            severity: Some(Severity::Mild),
            symptoms: vec!["Sneezing".into()],
            created_at,
        };
        allergies.create("alice", &original).await.unwrap();
        let mut live = allergies.subscribe("alice");
        let entry = live.next().await.unwrap().unwrap().remove(0);

        let mut modal = EditModal::default();
        modal.open(&entry);
        modal.set("severity", FieldValue::Text(String::new()));
        modal.set("subType", FieldValue::Text(" ".into()));
        modal.set("symptoms", FieldValue::Toggle("Sneezing".into()));
        modal.set("symptoms", FieldValue::Toggle("Cough".into()));
        modal.save(&allergies).await.unwrap();

        let saved = live.next().await.unwrap().unwrap().remove(0);
        assert_eq!(saved.fields.severity, None);
        assert_eq!(saved.fields.sub_type, None);
        assert_eq!(saved.fields.symptoms, vec!["Cough".to_string()]);
        assert_eq!(saved.fields.created_at, created_at);
    }

    #[test]
    fn test_reopen_reseeds_form() {
        let entry = |id: &str, allergen: &str| store::Entry {
            id: id.into(),
            owner_id: "alice".into(),
            fields: Allergy {
                allergen: allergen.into(),
                sub_type: None,
                severity: None,
                symptoms: vec![],
                created_at: Utc::now(),
            },
        };
        let mut modal = EditModal::<Allergy>::default();
        modal.open(&entry("1", "Pollen"));
        modal.set("allergy", FieldValue::Text("Dust".into()));
        modal.open(&entry("2", "Peanuts"));
        assert_eq!(modal.form().map(|f| f.allergen.as_str()), Some("Peanuts"));
    }
}
