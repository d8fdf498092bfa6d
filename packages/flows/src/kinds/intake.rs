//! Intake log wizard.
//!
//! Food goes through a meal category and then a food option; every other intake type
//! asks for the specific intake directly. Both branches end on the date step.

use chrono::{DateTime, Utc};
use store::{IntakeLog, IntakeType};

use crate::choice::Choice;
use crate::edit::{Editable, FieldInput, FieldPrompt, FieldValue};
use crate::error::ValidationError;
use crate::wizard::{Answer, CustomInput, StepPrompt, WizardKind};

use super::{apply_choice, display_date, lookup, options_for, Presentable};

pub const MEALS: &[(&str, &[&str])] = &[
    ("Breakfast", &["Eggs", "Toast", "Cereal", "Omelette"]),
    ("Lunch", &["Pasta", "Salad", "Sandwich", "Burger"]),
    ("Dinner", &["Steak", "Pizza", "Soup", "Sandwich"]),
    ("Snack", &["Fruit", "Chips", "Yogurt", "Nuts"]),
];

pub const INTAKES: &[(&str, &[&str])] = &[
    ("Drink", &["Water", "Juice", "Soda", "Coffee", "Tea"]),
    ("Cream", &["Moisturizer", "Sunscreen", "Medicine Cream"]),
    ("Supplement", &["Vitamin", "Protein Shake", "Mineral Supplement"]),
];

const EMOJIS: &[(&str, &str)] = &[
    ("Food", "🍎"),
    ("Drink", "🥤"),
    ("Cream", "🧴"),
    ("Supplement", "💊"),
    ("Other", "📋"),
];

const ACCENTS: &[(&str, &str)] = &[
    ("Food", "bg-green-100"),
    ("Drink", "bg-blue-100"),
    ("Cream", "bg-pink-100"),
    ("Supplement", "bg-yellow-100"),
    ("Other", "bg-gray-100"),
];

fn type_labels() -> Vec<&'static str> {
    IntakeType::ALL.iter().map(IntakeType::as_str).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntakeStep {
    Type,
    MealCategory,
    FoodOption,
    SpecificIntake,
    Date,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntakeDraft {
    pub intake_type: IntakeType,
    pub meal: Option<String>,
    pub food: Choice,
    pub specific: Choice,
    pub intake_date: Option<chrono::NaiveDate>,
}

impl WizardKind for IntakeLog {
    type Draft = IntakeDraft;
    type Step = IntakeStep;

    fn applicable_steps(draft: &IntakeDraft) -> Vec<IntakeStep> {
        match draft.intake_type {
            IntakeType::Food => vec![
                IntakeStep::Type,
                IntakeStep::MealCategory,
                IntakeStep::FoodOption,
                IntakeStep::Date,
            ],
            _ => vec![IntakeStep::Type, IntakeStep::SpecificIntake, IntakeStep::Date],
        }
    }

    fn prompt(step: IntakeStep, draft: &IntakeDraft) -> StepPrompt {
        match step {
            IntakeStep::Type => StepPrompt::Pick {
                title: "Select Intake Type".into(),
                options: type_labels(),
                selected: Some(draft.intake_type.as_str().to_string()),
                custom: None,
            },
            IntakeStep::MealCategory => StepPrompt::Pick {
                title: "Select Meal Category".into(),
                options: MEALS.iter().map(|(meal, _)| *meal).collect(),
                selected: draft.meal.clone(),
                custom: None,
            },
            IntakeStep::FoodOption => StepPrompt::Pick {
                title: format!("{} Options", draft.meal.as_deref().unwrap_or("Food")),
                options: draft
                    .meal
                    .as_deref()
                    .map(|meal| options_for(MEALS, meal).to_vec())
                    .unwrap_or_default(),
                selected: draft.food.selected().map(str::to_string),
                custom: Some(CustomInput {
                    placeholder: "Or enter a custom food option",
                    value: draft.food.custom().to_string(),
                }),
            },
            IntakeStep::SpecificIntake => StepPrompt::Pick {
                title: format!("{} Intake", draft.intake_type),
                options: options_for(INTAKES, draft.intake_type.as_str()).to_vec(),
                selected: draft.specific.selected().map(str::to_string),
                custom: Some(CustomInput {
                    placeholder: "Or enter a custom intake",
                    value: draft.specific.custom().to_string(),
                }),
            },
            IntakeStep::Date => StepPrompt::Date {
                title: "Intake Date".into(),
                value: draft.intake_date,
            },
        }
    }

    fn answer(step: IntakeStep, draft: &mut IntakeDraft, answer: Answer) {
        match (step, answer) {
            (IntakeStep::Type, Answer::Pick(label)) => {
                let Some(intake_type) = IntakeType::from_label(&label) else {
                    tracing::debug!(%label, "unknown intake type");
                    return;
                };
                if intake_type != draft.intake_type {
                    draft.intake_type = intake_type;
                    draft.meal = None;
                    draft.food.clear();
                    draft.specific.clear();
                }
            }
            (IntakeStep::MealCategory, Answer::Pick(meal)) => {
                if draft.meal.as_deref() != Some(meal.as_str()) {
                    draft.meal = Some(meal);
                    draft.food.clear();
                }
            }
            (IntakeStep::FoodOption, answer) => {
                apply_choice(&mut draft.food, answer);
            }
            (IntakeStep::SpecificIntake, answer) => {
                apply_choice(&mut draft.specific, answer);
            }
            (IntakeStep::Date, Answer::Date(date)) => draft.intake_date = date,
            (step, answer) => tracing::debug!(?step, ?answer, "ignored answer"),
        }
    }

    fn validate(step: IntakeStep, draft: &IntakeDraft) -> Result<(), ValidationError> {
        match step {
            IntakeStep::MealCategory if draft.meal.is_none() => {
                Err(ValidationError::missing("a meal category"))
            }
            IntakeStep::FoodOption if draft.food.is_empty() => {
                Err(ValidationError::missing("a food option"))
            }
            IntakeStep::SpecificIntake if draft.specific.is_empty() => {
                Err(ValidationError::missing("a specific intake"))
            }
            _ => Ok(()),
        }
    }

    fn build(draft: &IntakeDraft, _now: DateTime<Utc>) -> Self {
        let specific = match draft.intake_type {
            IntakeType::Food => draft.food.value(),
            _ => draft.specific.value(),
        };
        IntakeLog {
            intake_type: draft.intake_type,
            specific_intake: specific.unwrap_or_default(),
            intake_date: draft.intake_date,
            notes: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntakeForm {
    pub intake_type: IntakeType,
    pub specific_intake: String,
    pub intake_date: Option<chrono::NaiveDate>,
    pub notes: String,
}

impl Editable for IntakeLog {
    type Form = IntakeForm;

    fn seed(fields: &Self) -> IntakeForm {
        IntakeForm {
            intake_type: fields.intake_type,
            specific_intake: fields.specific_intake.clone(),
            intake_date: fields.intake_date,
            notes: fields.notes.clone(),
        }
    }

    fn fields(form: &IntakeForm) -> Vec<FieldPrompt> {
        vec![
            FieldPrompt {
                key: "intakeType",
                label: "Intake Type",
                input: FieldInput::Select {
                    options: type_labels(),
                    value: form.intake_type.as_str().to_string(),
                    blank: None,
                },
            },
            FieldPrompt {
                key: "specificIntake",
                label: "Specific Intake",
                input: FieldInput::Text(form.specific_intake.clone()),
            },
            FieldPrompt {
                key: "intakeDate",
                label: "Date",
                input: FieldInput::Date(form.intake_date),
            },
            FieldPrompt {
                key: "notes",
                label: "Notes",
                input: FieldInput::Text(form.notes.clone()),
            },
        ]
    }

    fn set(form: &mut IntakeForm, key: &str, value: FieldValue) {
        match (key, value) {
            ("intakeType", FieldValue::Text(label)) => {
                if let Some(intake_type) = IntakeType::from_label(&label) {
                    form.intake_type = intake_type;
                }
            }
            ("specificIntake", FieldValue::Text(text)) => form.specific_intake = text,
            ("intakeDate", FieldValue::Date(date)) => form.intake_date = date,
            ("notes", FieldValue::Text(text)) => form.notes = text,
            (key, value) => tracing::debug!(key, ?value, "ignored edit for unknown field"),
        }
    }

    fn apply(form: &IntakeForm, _previous: &Self) -> Self {
        IntakeLog {
            intake_type: form.intake_type,
            specific_intake: form.specific_intake.trim().to_string(),
            intake_date: form.intake_date,
            notes: form.notes.trim().to_string(),
        }
    }
}

impl Presentable for IntakeLog {
    const TITLE: &'static str = "My Intake Logs";
    const NOUN: &'static str = "Log";
    const EMPTY: &'static str = "No logs added yet.";

    fn emoji(&self) -> &'static str {
        lookup(EMOJIS, self.intake_type.as_str(), "📋")
    }

    fn accent(&self) -> &'static str {
        lookup(ACCENTS, self.intake_type.as_str(), "bg-blue-50")
    }

    fn headline(&self) -> String {
        self.specific_intake.clone()
    }

    fn details(&self) -> Vec<String> {
        vec![
            self.intake_type.as_str().to_string(),
            display_date(self.intake_date),
        ]
    }

    fn notes(&self) -> Option<&str> {
        (!self.notes.is_empty()).then_some(self.notes.as_str())
    }
}
