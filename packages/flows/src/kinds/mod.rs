//! # Per-kind configuration
//!
//! Each entity kind plugs into the generic engines through three traits:
//! [`WizardKind`](crate::wizard::WizardKind) (steps, prompts, validation, build),
//! [`Editable`](crate::edit::Editable) (edit form) and [`Presentable`] (list rows).
//! [`Kind`] bundles the three so pages can be generic over a single bound.
//!
//! | Module | Entity | Branching field |
//! |--------|--------|-----------------|
//! | [`appointment`] | `Appointment` | type |
//! | [`record`] | `MedicalRecord` | type |
//! | [`allergy`] | `Allergy` | allergen |
//! | [`intake`] | `IntakeLog` | intake type, meal category |
//!
//! Appointments and records share one shape and are both driven by [`visit`].

pub mod allergy;
pub mod appointment;
pub mod intake;
pub mod record;
pub mod visit;

use chrono::NaiveDate;
use store::Entity;

use crate::choice::Choice;
use crate::edit::Editable;
use crate::wizard::{Answer, WizardKind};

/// How an entity is rendered as a list row.
pub trait Presentable: Entity {
    /// Page heading, e.g. "My Appointments".
    const TITLE: &'static str;
    /// Singular label used on buttons and dialogs.
    const NOUN: &'static str;
    /// Shown when the list is empty.
    const EMPTY: &'static str;

    fn emoji(&self) -> &'static str;

    /// CSS background class for the row.
    fn accent(&self) -> &'static str;

    fn headline(&self) -> String;

    /// Secondary lines under the headline.
    fn details(&self) -> Vec<String>;

    fn notes(&self) -> Option<&str> {
        None
    }
}

/// Everything a generic entity page needs.
pub trait Kind: WizardKind + Editable + Presentable {}

impl<T: WizardKind + Editable + Presentable> Kind for T {}

/// Look `key` up in a display map, falling back to `default`.
pub(crate) fn lookup(
    map: &[(&str, &'static str)],
    key: &str,
    default: &'static str,
) -> &'static str {
    map.iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(default)
}

/// Options listed for `key` in a vocabulary map, or none.
pub(crate) fn options_for(
    map: &[(&str, &'static [&'static str])],
    key: &str,
) -> &'static [&'static str] {
    map.iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(&[])
}

/// Apply a pick or custom answer to `choice`. Returns whether its value changed.
pub(crate) fn apply_choice(choice: &mut Choice, answer: Answer) -> bool {
    let before = choice.value();
    match answer {
        Answer::Pick(value) => choice.pick(value),
        Answer::Custom(text) => choice.type_custom(&text),
        Answer::Toggle(_) | Answer::Date(_) => return false,
    }
    choice.value() != before
}

/// Date as shown on list rows.
pub(crate) fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| "No Date Set".to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for walking wizards in tests.

    use crate::wizard::{Answer, Wizard, WizardKind};

    pub fn pick<K: WizardKind>(wizard: &mut Wizard<K>, value: &str) {
        wizard.answer(Answer::Pick(value.to_string()));
    }

    /// Pick `value` and advance, asserting the step validates.
    pub fn pick_next<K: WizardKind>(wizard: &mut Wizard<K>, value: &str) {
        pick(wizard, value);
        wizard.next().expect("step should validate");
    }

    /// Visit every step with Next then walk back with Previous, asserting the
    /// same positions are seen in reverse.
    pub fn assert_symmetric<K: WizardKind>(wizard: &mut Wizard<K>) {
        let mut forward = vec![wizard.step()];
        while !wizard.is_last() {
            wizard.next().expect("answered steps should validate");
            forward.push(wizard.step());
        }
        let mut backward = vec![wizard.step()];
        while !wizard.is_first() {
            wizard.previous();
            backward.push(wizard.step());
        }
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward, wizard.steps());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back() {
        let map = [("Dentist", "🦷")];
        assert_eq!(lookup(&map, "Dentist", "📅"), "🦷");
        assert_eq!(lookup(&map, "Chiropractor", "📅"), "📅");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(NaiveDate::from_ymd_opt(2024, 3, 1)), "3/1/2024");
        assert_eq!(display_date(None), "No Date Set");
    }

    #[test]
    fn test_apply_choice_reports_change() {
        let mut choice = Choice::with_preset("Dentist");
        assert!(!apply_choice(&mut choice, Answer::Pick("Dentist".into())));
        assert!(apply_choice(&mut choice, Answer::Pick("Cardiologist".into())));
        assert!(apply_choice(&mut choice, Answer::Custom("Chiropractor".into())));
    }
}
