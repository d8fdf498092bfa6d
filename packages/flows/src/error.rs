//! Error taxonomy for the interaction flows.

use store::StoreError;
use thiserror::Error;

/// A required answer is missing on the current wizard step.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Please select or enter {field}.")]
pub struct ValidationError {
    pub field: &'static str,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

/// Sign-in and sign-out failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("could not reach the sign-in service: {0}")]
    Network(String),

    #[error("sign-in was rejected: {0}")]
    Rejected(String),

    #[error("You must be logged in.")]
    NotSignedIn,
}

/// Why a wizard could not advance or submit.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("You must be logged in to add an entry.")]
    NotSignedIn,

    #[error("submit is only possible on the last step")]
    NotAtLastStep,

    #[error("There was an error saving your entry ({0}). Please try again.")]
    Store(#[from] StoreError),
}
