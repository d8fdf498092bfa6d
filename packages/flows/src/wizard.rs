//! # Creation wizard: one engine for every entity kind
//!
//! A wizard walks the user through an ordered list of steps, accumulating a draft, and
//! creates the entity with a single terminal submit. Which steps exist depends on
//! earlier answers (an allergen with sub-types adds a step, food intake adds two), so
//! the engine never does index arithmetic to skip steps. Instead each kind supplies a
//! pure [`WizardKind::applicable_steps`] function and the engine recomputes that list
//! after every answer; Next and Previous both move by one position in the same list.
//!
//! ## Lifecycle
//!
//! 1. [`Wizard::answer`] applies input to the current step. Kinds clear downstream
//!    answers when a branching field changes; the engine then recomputes the step list
//!    and keeps the cursor on the step that was answered.
//! 2. [`Wizard::next`] validates the current step and advances, or records a
//!    [`ValidationError`] and stays put. [`Wizard::previous`] steps back, floored at 0.
//! 3. On the last step, [`Wizard::prepare_submit`] validates every applicable step
//!    and builds the entity. The caller writes it and reports the
//!    outcome to [`Wizard::finish_submit`], which resets on success and keeps the draft
//!    (with an error) on failure. [`Wizard::submit`] does both against a [`Collection`].

use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, Utc};
use store::{Collection, DocId, DocumentStore, Entity, OwnerId, StoreError};

use crate::error::{ValidationError, WizardError};

/// What the user is asked on one step, in a renderer-agnostic form.
#[derive(Clone, Debug, PartialEq)]
pub enum StepPrompt {
    /// Pick one option; optionally type a custom value instead.
    Pick {
        title: String,
        options: Vec<&'static str>,
        selected: Option<String>,
        custom: Option<CustomInput>,
    },
    /// Toggle any number of options.
    Toggle {
        title: String,
        options: Vec<&'static str>,
        selected: Vec<String>,
    },
    /// Pick a calendar date, or leave it blank.
    Date {
        title: String,
        value: Option<NaiveDate>,
    },
}

impl StepPrompt {
    pub fn title(&self) -> &str {
        match self {
            StepPrompt::Pick { title, .. }
            | StepPrompt::Toggle { title, .. }
            | StepPrompt::Date { title, .. } => title,
        }
    }
}

/// Free-text fallback shown under a list of options.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomInput {
    pub placeholder: &'static str,
    pub value: String,
}

/// User input for the current step.
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Pick(String),
    Custom(String),
    Toggle(String),
    Date(Option<NaiveDate>),
}

/// Per-kind configuration of the creation wizard.
pub trait WizardKind: Entity {
    type Draft: Clone + Debug + Default + PartialEq + 'static;
    type Step: Copy + Debug + Eq + 'static;

    /// Steps that apply to `draft`, in order. Never empty.
    fn applicable_steps(draft: &Self::Draft) -> Vec<Self::Step>;

    fn prompt(step: Self::Step, draft: &Self::Draft) -> StepPrompt;

    /// Apply `answer` to the field owned by `step`, clearing any answers that a
    /// changed branching field makes stale.
    fn answer(step: Self::Step, draft: &mut Self::Draft, answer: Answer);

    fn validate(step: Self::Step, draft: &Self::Draft) -> Result<(), ValidationError>;

    /// Build the entity from a fully validated draft.
    fn build(draft: &Self::Draft, now: DateTime<Utc>) -> Self;
}

/// State of one open creation wizard.
#[derive(Clone, Debug, PartialEq)]
pub struct Wizard<K: WizardKind> {
    draft: K::Draft,
    steps: Vec<K::Step>,
    index: usize,
    error: Option<WizardError>,
    submitting: bool,
}

impl<K: WizardKind> Default for Wizard<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: WizardKind> Wizard<K> {
    pub fn new() -> Self {
        let draft = K::Draft::default();
        let steps = K::applicable_steps(&draft);
        Self {
            draft,
            steps,
            index: 0,
            error: None,
            submitting: false,
        }
    }

    pub fn draft(&self) -> &K::Draft {
        &self.draft
    }

    pub fn steps(&self) -> &[K::Step] {
        &self.steps
    }

    pub fn step(&self) -> K::Step {
        self.steps[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.steps.len()
    }

    /// Completion in percent, counting the current step as done.
    pub fn progress_percent(&self) -> usize {
        (self.index + 1) * 100 / self.steps.len()
    }

    pub fn prompt(&self) -> StepPrompt {
        K::prompt(self.step(), &self.draft)
    }

    pub fn error(&self) -> Option<&WizardError> {
        self.error.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn answer(&mut self, answer: Answer) {
        let step = self.step();
        K::answer(step, &mut self.draft, answer);
        self.steps = K::applicable_steps(&self.draft);
        self.index = self
            .steps
            .iter()
            .position(|s| *s == step)
            .unwrap_or_else(|| self.index.min(self.steps.len() - 1));
        self.error = None;
    }

    /// Validate the current step and advance by one applicable step.
    pub fn next(&mut self) -> Result<(), ValidationError> {
        if let Err(e) = K::validate(self.step(), &self.draft) {
            self.error = Some(e.clone().into());
            return Err(e);
        }
        self.index = (self.index + 1).min(self.steps.len() - 1);
        self.error = None;
        Ok(())
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
        self.error = None;
    }

    /// Discard all answers.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validate everything and build the entity to create for `owner_id`.
    pub fn prepare_submit(
        &mut self,
        owner_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(OwnerId, K), WizardError> {
        let result = self.check_submit(owner_id);
        match result {
            Ok(owner_id) => {
                self.error = None;
                self.submitting = true;
                Ok((owner_id, K::build(&self.draft, now)))
            }
            Err(e) => {
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn check_submit(&self, owner_id: Option<&str>) -> Result<OwnerId, WizardError> {
        if !self.is_last() {
            return Err(WizardError::NotAtLastStep);
        }
        for step in &self.steps {
            K::validate(*step, &self.draft)?;
        }
        owner_id
            .map(str::to_string)
            .ok_or(WizardError::NotSignedIn)
    }

    /// Record the outcome of the create issued after [`Self::prepare_submit`].
    pub fn finish_submit(
        &mut self,
        result: Result<DocId, StoreError>,
    ) -> Result<DocId, WizardError> {
        self.submitting = false;
        match result {
            Ok(id) => {
                self.reset();
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(collection = K::COLLECTION, error = %e, "wizard submit failed");
                let err = WizardError::Store(e);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Build, create and record the outcome in one call.
    pub async fn submit<S: DocumentStore>(
        &mut self,
        collection: &Collection<S, K>,
        owner_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DocId, WizardError> {
        let (owner_id, entity) = self.prepare_submit(owner_id, now)?;
        let result = collection.create(&owner_id, &entity).await;
        self.finish_submit(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::testing::pick_next;
    use futures::StreamExt;
    use store::{MedicalRecord, MemoryStore};

    #[tokio::test]
    async fn test_failed_submit_keeps_answers() {
        let store = MemoryStore::new();
        let records = Collection::<_, MedicalRecord>::new(store.clone());
        let mut wizard = Wizard::<MedicalRecord>::new();
        pick_next(&mut wizard, "Prescription");
        pick_next(&mut wizard, "Aspirin");

        store.set_offline(true);
        let err = wizard
            .submit(&records, Some("alice"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Store(StoreError::Unavailable(_))));
        assert_eq!(wizard.index(), 2);
        assert_eq!(wizard.draft().purpose.value().as_deref(), Some("Aspirin"));
        assert_eq!(wizard.error(), Some(&err));
        assert!(!wizard.is_submitting());

        store.set_offline(false);
        wizard
            .submit(&records, Some("alice"), Utc::now())
            .await
            .unwrap();
        assert_eq!(wizard.index(), 0);
        assert!(wizard.error().is_none());

        let entries = records.subscribe("alice").next().await.unwrap().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].fields.purpose, "Aspirin");
    }
}
