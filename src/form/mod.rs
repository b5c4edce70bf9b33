mod engine;
mod field;
mod model;
mod validation;

#[cfg(test)]
mod tests;

pub use engine::{
    CharacterCount, FailureCause, FormEngine, FormError, FormId, FormOptions, FormResult,
    FormSnapshot, FormStatus, PendingSubmission, SubmitOutcome, SubmitStart, SubmitTicket,
    await_delivery,
};
pub use field::{FieldDescriptor, FieldKind, FormValues, Validator};
pub use leadform_derive::FormModel;
pub use model::FormModel;
pub use validation::{FieldError, FieldErrorKind, is_valid_email, validate_field, validate_fields};
