//! Lead-capture forms of the site, each a field list plus the webhook it posts to.

mod validators;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::config::{ConfigError, SiteConfig};
use crate::form::{FieldDescriptor, FormEngine, FormModel};
use crate::shell::{FormShell, ModalBehavior, PresentationMode, ShellContent, SuccessMessage};
use crate::submit::{SubmitError, WebhookSubmitter};

pub use validators::{validate_handle, validate_url};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, FormModel)]
pub struct CareerApplication {
    #[field(label = "leads.career.full_name", required)]
    pub full_name: String,
    #[field(kind = "email", label = "leads.career.email", required)]
    pub email: String,
    #[field(label = "leads.career.role", required)]
    pub role: String,
    #[field(
        label = "leads.career.portfolio",
        placeholder = "https://",
        validator = validate_url
    )]
    pub portfolio: String,
    #[field(
        kind = "prefixed_text",
        label = "leads.career.instagram",
        prefix = "@",
        validator = validate_handle
    )]
    pub instagram: String,
    #[field(
        kind = "textarea",
        label = "leads.career.motivation",
        required,
        max_length = 600
    )]
    pub motivation: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, FormModel)]
pub struct CourseApplication {
    #[field(label = "leads.course.full_name", required)]
    pub full_name: String,
    #[field(kind = "email", label = "leads.course.email", required)]
    pub email: String,
    #[field(label = "leads.course.course", required)]
    pub course: String,
    #[field(kind = "textarea", label = "leads.course.experience", max_length = 400)]
    pub experience: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, FormModel)]
pub struct WorkshopRegistration {
    #[field(label = "leads.workshop.full_name", required)]
    pub full_name: String,
    #[field(kind = "email", label = "leads.workshop.email", required)]
    pub email: String,
    #[field(label = "leads.workshop.workshop", required)]
    pub workshop: String,
    #[field(label = "leads.workshop.company")]
    pub company: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, FormModel)]
pub struct WaitlistSignup {
    #[field(
        id = "waitlist-email",
        kind = "email",
        label = "leads.waitlist.email",
        placeholder = "you@example.com",
        required
    )]
    pub email: String,
    #[field(
        kind = "prefixed_text",
        label = "leads.waitlist.instagram",
        prefix = "@",
        validator = validate_handle
    )]
    pub instagram: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, FormModel)]
pub struct ContactRequest {
    #[field(label = "leads.contact.full_name", required)]
    pub full_name: String,
    #[field(kind = "email", label = "leads.contact.email", required)]
    pub email: String,
    #[field(kind = "textarea", label = "leads.contact.message", required, max_length = 1000)]
    pub message: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LeadKind {
    Career,
    Course,
    Workshop,
    Waitlist,
    Contact,
}

impl LeadKind {
    pub const ALL: [LeadKind; 5] = [
        Self::Career,
        Self::Course,
        Self::Workshop,
        Self::Waitlist,
        Self::Contact,
    ];

    /// Name of the `[webhooks.<name>]` table this form posts to.
    pub fn endpoint_name(self) -> &'static str {
        match self {
            Self::Career => "career",
            Self::Course => "course",
            Self::Workshop => "workshop",
            Self::Waitlist => "waitlist",
            Self::Contact => "contact",
        }
    }

    pub fn descriptors(self) -> Vec<FieldDescriptor> {
        match self {
            Self::Career => CareerApplication::descriptors(),
            Self::Course => CourseApplication::descriptors(),
            Self::Workshop => WorkshopRegistration::descriptors(),
            Self::Waitlist => WaitlistSignup::descriptors(),
            Self::Contact => ContactRequest::descriptors(),
        }
    }

    pub fn presentation(self) -> PresentationMode {
        match self {
            Self::Waitlist => PresentationMode::Inline,
            Self::Contact => PresentationMode::Modal(ModalBehavior::default().reset_on_open(false)),
            Self::Career | Self::Course | Self::Workshop => {
                PresentationMode::Modal(ModalBehavior::default())
            }
        }
    }

    pub fn content(self) -> ShellContent {
        match self {
            Self::Career => ShellContent::new()
                .title("leads.career.title")
                .description("leads.career.description"),
            Self::Course => ShellContent::new()
                .title("leads.course.title")
                .description("leads.course.description"),
            Self::Workshop => ShellContent::new().title("leads.workshop.title"),
            Self::Waitlist => ShellContent::new()
                .title("leads.waitlist.title")
                .description("leads.waitlist.description")
                .footer_text("leads.waitlist.footer"),
            Self::Contact => ShellContent::new().title("leads.contact.title").success(
                SuccessMessage::new("form.success.title", "leads.contact.success")
                    .auto_dismiss(Duration::from_secs(4)),
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum LeadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Binds a lead form to its configured webhook.
pub fn lead_adapter(
    kind: LeadKind,
    config: &SiteConfig,
    runtime: Arc<Runtime>,
) -> Result<WebhookSubmitter, LeadError> {
    let endpoint = config.endpoint(kind.endpoint_name())?.clone();
    Ok(WebhookSubmitter::new(endpoint, runtime)?)
}

/// Engine and shell for `kind`, configured from `config`.
pub fn lead_shell(kind: LeadKind, config: &SiteConfig) -> FormShell {
    let engine = FormEngine::new(kind.descriptors(), config.form_options());
    FormShell::new(engine, kind.presentation(), kind.content())
}
