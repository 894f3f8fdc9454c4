//! Form domain layer
//!
//! Step and field definitions for each flow, the answers they collect, the
//! validation rules over those answers, and the engine that sequences steps
//! and gates submission.

mod answers;
mod field;
mod flows;
mod form_state;
mod step;
mod validation;

pub use answers::{AttachedFile, FormAnswers};
pub use field::FieldType;
pub use flows::FormType;
pub use form_state::{FormEngine, Phase, StepMove, SubmissionRequest, SubmitBlocked};
pub use step::{StepDefinition, StepKind, OTHER_OPTION};

#[cfg(test)]
pub use answers::AnswerValue;
#[cfg(test)]
pub use field::FieldRule;
