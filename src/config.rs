// Webhook endpoints and form defaults, loaded from TOML

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::{FormOptions, FormValues};
use crate::i18n::I18nManager;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no webhook endpoint named `{0}`")]
    MissingEndpoint(String),

    #[error("webhook `{name}` has an invalid url `{url}`")]
    InvalidUrl { name: String, url: String },
}

/// How collected values are encoded in the POST body.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    #[default]
    Json,
    FormUrlencoded,
}

/// What counts as a successful delivery.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCheck {
    /// Any 2xx status.
    #[default]
    HttpStatus,
    /// 2xx status and a JSON body of the form `{"success": true}`.
    JsonSuccessFlag,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    pub url: String,
    #[serde(default)]
    pub encoding: PayloadEncoding,
    #[serde(default)]
    pub response: ResponseCheck,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent with every submission, e.g. a `source` tag. Never overrides a form value.
    #[serde(default)]
    pub static_fields: BTreeMap<String, String>,
    /// Form field name -> key expected by the webhook.
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl WebhookEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            encoding: PayloadEncoding::default(),
            response: ResponseCheck::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            static_fields: BTreeMap::new(),
            rename: BTreeMap::new(),
        }
    }

    pub fn encoding(mut self, value: PayloadEncoding) -> Self {
        self.encoding = value;
        self
    }

    pub fn response(mut self, value: ResponseCheck) -> Self {
        self.response = value;
        self
    }

    pub fn static_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_fields.insert(key.into(), value.into());
        self
    }

    pub fn rename(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.rename.insert(field.into(), key.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Key/value pairs to send: every form value under its (possibly renamed) key,
    /// followed by the static fields whose keys are not taken yet.
    pub fn payload(&self, values: &FormValues) -> Vec<(String, String)> {
        let mut pairs = values
            .iter()
            .map(|(name, value)| {
                let key = self.rename.get(name).map_or(name, String::as_str);
                (key.to_string(), value.to_string())
            })
            .collect::<Vec<_>>();
        for (key, value) in &self.static_fields {
            if !pairs.iter().any(|(existing, _)| existing == key) {
                pairs.push((key.clone(), value.clone()));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub submit_timeout_secs: Option<u64>,
    #[serde(default)]
    pub webhooks: BTreeMap<String, WebhookEndpoint>,
}

impl SiteConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        log::info!(
            "Loaded {} webhook endpoint(s) from {}",
            config.webhooks.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn endpoint(&self, name: &str) -> Result<&WebhookEndpoint, ConfigError> {
        self.webhooks
            .get(name)
            .ok_or_else(|| ConfigError::MissingEndpoint(name.to_string()))
    }

    pub fn form_options(&self) -> FormOptions {
        let i18n = match &self.locale {
            Some(locale) => I18nManager::with_locale(locale.as_str()),
            None => I18nManager::new(),
        };
        FormOptions {
            submit_timeout: self.submit_timeout_secs.map(Duration::from_secs),
            i18n,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, endpoint) in &self.webhooks {
            let url = endpoint.url.trim();
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidUrl {
                    name: name.clone(),
                    url: endpoint.url.clone(),
                });
            }
        }
        Ok(())
    }
}
