use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, LazyLock, RwLock};

use gpui::SharedString;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/leadform_i18n_generated.rs"));
}

static CATALOG: LazyLock<Arc<I18nCatalog>> = LazyLock::new(|| Arc::new(I18nCatalog::load()));

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("system") {
            return Self::System;
        }
        Self::Tag(value.trim().to_string())
    }
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

/// Translation function for every user-visible string of the form shell.
///
/// Unknown keys pass through unchanged, so literal labels work as their own key.
#[derive(Clone)]
pub struct I18nManager {
    catalog: Arc<I18nCatalog>,
    locale: Arc<RwLock<Locale>>,
}

impl Default for I18nManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for I18nManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nManager")
            .field("locale", &self.locale())
            .field("resolved", &self.resolved_locale())
            .finish()
    }
}

impl I18nManager {
    pub fn new() -> Self {
        Self {
            catalog: CATALOG.clone(),
            locale: Arc::new(RwLock::new(Locale::System)),
        }
    }

    pub fn with_locale(locale: impl Into<Locale>) -> Self {
        let manager = Self::new();
        manager.set_locale(locale);
        manager
    }

    pub fn locale(&self) -> Locale {
        match self.locale.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        let locale = locale.into();
        match self.locale.write() {
            Ok(mut guard) => *guard = locale,
            Err(poisoned) => *poisoned.into_inner() = locale,
        }
    }

    pub fn default_locale(&self) -> &'static str {
        self.catalog.default_locale
    }

    pub fn resolved_locale(&self) -> &'static str {
        self.catalog
            .resolve_locale(self.requested_locale().as_deref())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn t(&self, key: &str) -> SharedString {
        match self.lookup(key) {
            Some(value) => value.into(),
            None => key.to_string().into(),
        }
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> SharedString {
        let template = self.lookup(key).unwrap_or(key);
        if params.is_empty() {
            return template.to_string().into();
        }
        format_template(template, params).into()
    }

    fn requested_locale(&self) -> Option<String> {
        match self.locale() {
            Locale::System => system_locale(),
            Locale::Tag(tag) => Some(tag),
        }
    }

    /// Resolved locale first, then the default locale.
    fn lookup(&self, key: &str) -> Option<&'static str> {
        let resolved = self.resolved_locale();
        self.catalog
            .lookup(resolved, key)
            .or_else(|| self.catalog.lookup(self.catalog.default_locale, key))
    }
}

#[cfg(feature = "i18n")]
fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}

#[cfg(not(feature = "i18n"))]
fn system_locale() -> Option<String> {
    None
}

struct I18nCatalog {
    default_locale: &'static str,
    locales: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    by_tag: HashMap<String, &'static str>,
    by_language: HashMap<String, &'static str>,
}

impl I18nCatalog {
    fn load() -> Self {
        let mut locales = HashMap::new();
        let mut by_tag = HashMap::new();
        let mut by_language: HashMap<String, Option<&'static str>> = HashMap::new();

        for (locale, entries) in generated::LOCALES.iter().copied() {
            let normalized = normalize_locale_tag(locale);
            let language = primary_language(&normalized).to_string();
            by_tag.insert(normalized, locale);
            by_language
                .entry(language)
                .and_modify(|existing| {
                    if *existing != Some(locale) {
                        *existing = None;
                    }
                })
                .or_insert(Some(locale));
            locales.insert(locale, entries.iter().copied().collect::<HashMap<_, _>>());
        }

        locales.entry(generated::DEFAULT_LOCALE).or_default();
        let default_tag = normalize_locale_tag(generated::DEFAULT_LOCALE);
        by_language
            .entry(primary_language(&default_tag).to_string())
            .or_insert(Some(generated::DEFAULT_LOCALE));
        by_tag
            .entry(default_tag)
            .or_insert(generated::DEFAULT_LOCALE);

        Self {
            default_locale: generated::DEFAULT_LOCALE,
            locales,
            by_tag,
            by_language: by_language
                .into_iter()
                .filter_map(|(language, locale)| locale.map(|locale| (language, locale)))
                .collect(),
        }
    }

    fn resolve_locale(&self, requested: Option<&str>) -> &'static str {
        let Some(requested) = requested else {
            return self.default_locale;
        };

        let normalized = normalize_locale_tag(requested);
        self.by_tag
            .get(&normalized)
            .or_else(|| self.by_language.get(primary_language(&normalized)))
            .copied()
            .unwrap_or(self.default_locale)
    }

    fn lookup(&self, locale: &'static str, key: &str) -> Option<&'static str> {
        self.locales
            .get(locale)
            .and_then(|entries| entries.get(key).copied())
    }
}

fn primary_language(normalized_tag: &str) -> &str {
    normalized_tag.split('-').next().unwrap_or_default()
}

/// `en_US.UTF-8` and `EN-us` both normalize to `en-us`.
fn normalize_locale_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    let without_encoding = trimmed.split('.').next().unwrap_or(trimmed);
    let without_variant = without_encoding
        .split('@')
        .next()
        .unwrap_or(without_encoding);
    without_variant
        .replace('_', "-")
        .split('-')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Replaces `{name}` placeholders. Unknown placeholders are kept verbatim.
fn format_template(template: &str, params: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };

        let token = &after_open[..close];
        match params.iter().find(|(name, _)| *name == token) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }

    output.push_str(rest);
    output
}
