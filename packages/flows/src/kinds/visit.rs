//! Shared wizard and edit form for type/purpose/date entities.
//!
//! Appointments and medical records have the same three steps: a type from a fixed
//! list, a purpose whose presets depend on the type, and an optional date. Changing
//! the type clears the purpose.

use std::fmt;
use std::marker::PhantomData;

use chrono::NaiveDate;
use store::Entity;

use crate::choice::Choice;
use crate::edit::{FieldInput, FieldPrompt, FieldValue};
use crate::error::ValidationError;
use crate::wizard::{Answer, CustomInput, StepPrompt};

use super::{apply_choice, options_for};

/// Option lists and labels for one visit-like kind.
pub struct Vocabulary {
    /// Lower-case noun used in prompts, e.g. "appointment".
    pub noun: &'static str,
    /// Field name used in the missing-type message.
    pub type_field: &'static str,
    pub types: &'static [&'static str],
    pub default_type: &'static str,
    pub purposes: &'static [(&'static str, &'static [&'static str])],
}

/// An entity made of type, purpose, date and notes.
pub trait Visit: Entity {
    const VOCABULARY: Vocabulary;

    fn assemble(
        kind: String,
        purpose: String,
        start_date: Option<NaiveDate>,
        notes: String,
    ) -> Self;

    fn parts(&self) -> VisitParts<'_>;
}

pub struct VisitParts<'a> {
    pub kind: &'a str,
    pub purpose: &'a str,
    pub start_date: Option<NaiveDate>,
    pub notes: &'a str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitStep {
    Type,
    Purpose,
    Date,
}

pub struct VisitDraft<K> {
    pub kind: Choice,
    pub purpose: Choice,
    pub start_date: Option<NaiveDate>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Visit> Default for VisitDraft<K> {
    fn default() -> Self {
        Self {
            kind: Choice::with_preset(K::VOCABULARY.default_type),
            purpose: Choice::default(),
            start_date: None,
            _kind: PhantomData,
        }
    }
}

impl<K> Clone for VisitDraft<K> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            purpose: self.purpose.clone(),
            start_date: self.start_date,
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for VisitDraft<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitDraft")
            .field("kind", &self.kind)
            .field("purpose", &self.purpose)
            .field("start_date", &self.start_date)
            .finish()
    }
}

impl<K> PartialEq for VisitDraft<K> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.purpose == other.purpose
            && self.start_date == other.start_date
    }
}

pub fn applicable_steps() -> Vec<VisitStep> {
    vec![VisitStep::Type, VisitStep::Purpose, VisitStep::Date]
}

pub fn prompt<K: Visit>(step: VisitStep, draft: &VisitDraft<K>) -> StepPrompt {
    let vocab = K::VOCABULARY;
    match step {
        VisitStep::Type => StepPrompt::Pick {
            title: format!("Select {} Type", title_case(vocab.noun)),
            options: vocab.types.to_vec(),
            selected: draft.kind.selected().map(str::to_string),
            custom: None,
        },
        VisitStep::Purpose => {
            let kind = draft.kind.value().unwrap_or_default();
            StepPrompt::Pick {
                title: format!("{kind} Purpose"),
                options: options_for(vocab.purposes, &kind).to_vec(),
                selected: draft.purpose.selected().map(str::to_string),
                custom: Some(CustomInput {
                    placeholder: "Or enter a custom purpose",
                    value: draft.purpose.custom().to_string(),
                }),
            }
        }
        VisitStep::Date => StepPrompt::Date {
            title: format!("{} Date", title_case(vocab.noun)),
            value: draft.start_date,
        },
    }
}

pub fn answer<K>(step: VisitStep, draft: &mut VisitDraft<K>, answer: Answer) {
    match (step, answer) {
        (VisitStep::Date, Answer::Date(date)) => draft.start_date = date,
        (VisitStep::Type, answer) => {
            if apply_choice(&mut draft.kind, answer) {
                draft.purpose.clear();
            }
        }
        (VisitStep::Purpose, answer) => {
            apply_choice(&mut draft.purpose, answer);
        }
        (VisitStep::Date, _) => {}
    }
}

pub fn validate<K: Visit>(step: VisitStep, draft: &VisitDraft<K>) -> Result<(), ValidationError> {
    match step {
        VisitStep::Type if draft.kind.is_empty() => {
            Err(ValidationError::missing(K::VOCABULARY.type_field))
        }
        VisitStep::Purpose if draft.purpose.is_empty() => {
            Err(ValidationError::missing("a purpose"))
        }
        _ => Ok(()),
    }
}

pub fn build<K: Visit>(draft: &VisitDraft<K>) -> K {
    K::assemble(
        draft.kind.value().unwrap_or_default(),
        draft.purpose.value().unwrap_or_default(),
        draft.start_date,
        String::new(),
    )
}

/// Edit form for a visit-like entity. Every field is free text except the date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitForm {
    pub kind: String,
    pub purpose: String,
    pub start_date: Option<NaiveDate>,
    pub notes: String,
}

pub fn seed<K: Visit>(fields: &K) -> VisitForm {
    let parts = fields.parts();
    VisitForm {
        kind: parts.kind.to_string(),
        purpose: parts.purpose.to_string(),
        start_date: parts.start_date,
        notes: parts.notes.to_string(),
    }
}

pub fn fields(form: &VisitForm) -> Vec<FieldPrompt> {
    vec![
        FieldPrompt {
            key: "type",
            label: "Type",
            input: FieldInput::Text(form.kind.clone()),
        },
        FieldPrompt {
            key: "purpose",
            label: "Purpose",
            input: FieldInput::Text(form.purpose.clone()),
        },
        FieldPrompt {
            key: "startDate",
            label: "Date",
            input: FieldInput::Date(form.start_date),
        },
        FieldPrompt {
            key: "notes",
            label: "Notes",
            input: FieldInput::Text(form.notes.clone()),
        },
    ]
}

pub fn set(form: &mut VisitForm, key: &str, value: FieldValue) {
    match (key, value) {
        ("type", FieldValue::Text(text)) => form.kind = text,
        ("purpose", FieldValue::Text(text)) => form.purpose = text,
        ("startDate", FieldValue::Date(date)) => form.start_date = date,
        ("notes", FieldValue::Text(text)) => form.notes = text,
        (key, value) => tracing::debug!(key, ?value, "ignored edit for unknown field"),
    }
}

pub fn apply<K: Visit>(form: &VisitForm) -> K {
    K::assemble(
        form.kind.trim().to_string(),
        form.purpose.trim().to_string(),
        form.start_date,
        form.notes.trim().to_string(),
    )
}

fn title_case(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
