use super::field::{FieldDescriptor, FormValues};

/// A strongly typed form: declares its fields and rebuilds itself from submitted values.
///
/// Usually derived with `#[derive(FormModel)]`, one `#[field(...)]` attribute per
/// `String` member.
pub trait FormModel: Sized {
    fn descriptors() -> Vec<FieldDescriptor>;
    fn from_values(values: &FormValues) -> Self;
}
