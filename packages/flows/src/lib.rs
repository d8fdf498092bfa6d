//! Interaction flows for Medicolog, independent of any UI toolkit.

pub mod choice;
pub mod confirm;
pub mod edit;
pub mod error;
pub mod kinds;
pub mod list;
pub mod session;
pub mod wizard;

pub use choice::Choice;
pub use confirm::DeleteConfirmation;
pub use edit::{EditModal, Editable, FieldInput, FieldPrompt, FieldValue};
pub use error::{AuthError, ValidationError, WizardError};
pub use kinds::{Kind, Presentable};
pub use list::{EntityList, ListStatus, LiveList};
pub use session::{AuthBackend, Identity, SessionState, SignIn};
pub use wizard::{Answer, CustomInput, StepPrompt, Wizard, WizardKind};
