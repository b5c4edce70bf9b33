use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use gpui::SharedString;
use regex::Regex;

use super::field::{FieldDescriptor, FieldKind, FormValues};
use crate::i18n::I18nManager;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern must compile"));

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldErrorKind {
    Required,
    Custom,
    InvalidEmail,
    TooLong { max: usize },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    kind: FieldErrorKind,
    message: SharedString,
}

impl FieldError {
    pub fn new(kind: FieldErrorKind, message: impl Into<SharedString>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    pub fn message(&self) -> &SharedString {
        &self.message
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Checks one field in the fixed order `required`, custom validator, built-in kind
/// rules. The first failing rule wins.
pub fn validate_field(
    field: &FieldDescriptor,
    value: &str,
    i18n: &I18nManager,
) -> Option<FieldError> {
    let label = i18n.t(field.label_ref());

    if value.trim().is_empty() {
        return field.is_required().then(|| {
            FieldError::new(
                FieldErrorKind::Required,
                i18n.t_with("form.error.required", &[("label", &*label)]),
            )
        });
    }

    if let Some(validator) = field.validator_ref()
        && let Some(message) = validator(value)
    {
        return Some(FieldError::new(FieldErrorKind::Custom, i18n.t(&message)));
    }

    if field.kind_ref() == FieldKind::Email && !is_valid_email(value) {
        return Some(FieldError::new(
            FieldErrorKind::InvalidEmail,
            i18n.t_with("form.error.email", &[("label", &*label)]),
        ));
    }

    if let Some(max) = field.max_length_ref()
        && value.chars().count() > max
    {
        let max_text = max.to_string();
        return Some(FieldError::new(
            FieldErrorKind::TooLong { max },
            i18n.t_with(
                "form.error.too_long",
                &[("label", &*label), ("max", max_text.as_str())],
            ),
        ));
    }

    None
}

/// Validates every declared field without stopping at the first invalid one.
pub fn validate_fields(
    fields: &[FieldDescriptor],
    values: &FormValues,
    i18n: &I18nManager,
) -> BTreeMap<String, FieldError> {
    fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.value(field.name_ref()), i18n)
                .map(|error| (field.name_ref().to_string(), error))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i18n() -> I18nManager {
        let i18n = I18nManager::new();
        i18n.set_locale("en-US");
        i18n
    }

    #[test]
    fn email_pattern_requires_at_and_dot() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn optional_empty_field_skips_every_rule() {
        let field = FieldDescriptor::email("email").validator(|_| Some("never".into()));
        assert_eq!(validate_field(&field, "", &i18n()), None);
    }

    #[test]
    fn whitespace_only_value_counts_as_missing() {
        let field = FieldDescriptor::text("name").label("Name").required(true);
        let error = validate_field(&field, "   ", &i18n()).expect("required error");
        assert_eq!(error.kind(), FieldErrorKind::Required);
        assert_eq!(error.message().to_string(), "Name is required");
    }

    #[test]
    fn custom_validator_runs_before_builtin_email_rule() {
        let field = FieldDescriptor::email("email")
            .required(true)
            .validator(|value| value.contains("spam").then(|| "No spam".into()));

        let custom = validate_field(&field, "spam", &i18n()).expect("custom error");
        assert_eq!(custom.kind(), FieldErrorKind::Custom);
        assert_eq!(custom.message().to_string(), "No spam");

        let builtin = validate_field(&field, "nope", &i18n()).expect("email error");
        assert_eq!(builtin.kind(), FieldErrorKind::InvalidEmail);
    }

    #[test]
    fn max_length_overflow_is_reported_after_kind_rules() {
        let field = FieldDescriptor::textarea("bio").max_length(3);
        let error = validate_field(&field, "abcd", &i18n()).expect("too long");
        assert_eq!(error.kind(), FieldErrorKind::TooLong { max: 3 });
        assert_eq!(validate_field(&field, "abc", &i18n()), None);
    }

    #[test]
    fn validate_fields_reports_every_invalid_field() {
        let fields = vec![
            FieldDescriptor::text("name").required(true),
            FieldDescriptor::email("email").required(true),
            FieldDescriptor::text("company"),
        ];
        let values = FormValues::empty_for(&fields);
        let errors = validate_fields(&fields, &values, &i18n());
        assert_eq!(
            errors.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["email", "name"]
        );
    }
}
