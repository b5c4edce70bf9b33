use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use gpui::SharedString;
use serde::{Deserialize, Serialize};

/// Custom per-field check. Returns the error message when the value is rejected.
///
/// Only invoked for non-empty values; emptiness is the `required` rule's concern.
pub type Validator = Arc<dyn Fn(&str) -> Option<SharedString> + Send + Sync>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FieldKind {
    Text,
    Email,
    Textarea,
    /// Handle-style input rendered behind a fixed visual prefix such as `@`.
    PrefixedText,
}

impl FieldKind {
    pub fn is_multiline(self) -> bool {
        self == Self::Textarea
    }
}

#[derive(Clone)]
pub struct FieldDescriptor {
    id: SharedString,
    name: SharedString,
    kind: FieldKind,
    label: SharedString,
    placeholder: Option<SharedString>,
    prefix: SharedString,
    required: bool,
    max_length: Option<usize>,
    validator: Option<Validator>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<SharedString>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            label: name.clone(),
            name,
            kind,
            placeholder: None,
            prefix: "@".into(),
            required: false,
            max_length: None,
            validator: None,
        }
    }

    pub fn text(name: impl Into<SharedString>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn email(name: impl Into<SharedString>) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn textarea(name: impl Into<SharedString>) -> Self {
        Self::new(name, FieldKind::Textarea)
    }

    pub fn prefixed(name: impl Into<SharedString>, prefix: impl Into<SharedString>) -> Self {
        Self::new(name, FieldKind::PrefixedText).prefix(prefix)
    }

    pub fn id(mut self, value: impl Into<SharedString>) -> Self {
        self.id = value.into();
        self
    }

    pub fn label(mut self, value: impl Into<SharedString>) -> Self {
        self.label = value.into();
        self
    }

    pub fn placeholder(mut self, value: impl Into<SharedString>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    pub fn prefix(mut self, value: impl Into<SharedString>) -> Self {
        self.prefix = value.into();
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn max_length(mut self, value: usize) -> Self {
        self.max_length = Some(value);
        self
    }

    pub fn validator(
        mut self,
        validator: impl Fn(&str) -> Option<SharedString> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn id_ref(&self) -> &SharedString {
        &self.id
    }

    pub fn name_ref(&self) -> &SharedString {
        &self.name
    }

    pub fn kind_ref(&self) -> FieldKind {
        self.kind
    }

    pub fn label_ref(&self) -> &SharedString {
        &self.label
    }

    pub fn placeholder_ref(&self) -> Option<&SharedString> {
        self.placeholder.as_ref()
    }

    /// Prefix shown in front of a [`FieldKind::PrefixedText`] input; `None` for other kinds.
    pub fn prefix_ref(&self) -> Option<&SharedString> {
        (self.kind == FieldKind::PrefixedText).then_some(&self.prefix)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn max_length_ref(&self) -> Option<usize> {
        self.max_length
    }

    pub fn validator_ref(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Whether edits to this field drive a live character counter.
    pub fn has_counter(&self) -> bool {
        self.kind.is_multiline() && self.max_length.is_some()
    }

    /// Normalizes raw input before it is stored.
    ///
    /// Prefixed inputs drop copies of the prefix typed by the user so the stored
    /// handle never carries the decoration twice.
    pub fn normalize_input(&self, raw: String) -> String {
        match self.prefix_ref() {
            Some(prefix) if !prefix.is_empty() && raw.starts_with(prefix.as_str()) => {
                raw.trim_start_matches(prefix.as_str()).to_string()
            }
            _ => raw,
        }
    }
}

impl Debug for FieldDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("max_length", &self.max_length)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Current value of every declared field, keyed by field name.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// All-empty mapping for the given field list. Later duplicates overwrite earlier ones.
    pub fn empty_for(fields: &[FieldDescriptor]) -> Self {
        Self(
            fields
                .iter()
                .map(|field| (field.name.to_string(), String::new()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of `name`, or `""` for undeclared names.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
