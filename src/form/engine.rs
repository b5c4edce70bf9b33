use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures::future::{self, Either};
use futures_timer::Delay;
use gpui::SharedString;

use super::field::{FieldDescriptor, FormValues};
use super::model::FormModel;
use super::validation::{FieldError, validate_fields};
use crate::i18n::I18nManager;

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form-{}", self.0)
    }
}

/// Identifies one accepted submission. Completions carrying an outdated ticket are dropped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubmitTicket(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormStatus {
    Idle,
    Submitting,
    Success,
    Error,
}

/// Why a form is in [`FormStatus::Error`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FailureCause {
    /// One or more fields failed validation; the details live in the field errors.
    Validation { invalid_fields: usize },
    /// The submit callback rejected.
    Transport { message: SharedString },
    /// The submit callback did not settle within [`FormOptions::submit_timeout`].
    TimedOut,
}

impl FailureCause {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation { .. })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Submitted,
    Invalid,
    Failed,
    AlreadySubmitting,
    Stale,
}

#[derive(Clone, Debug)]
pub struct PendingSubmission {
    pub ticket: SubmitTicket,
    pub values: FormValues,
}

#[derive(Clone, Debug)]
pub enum SubmitStart {
    Ready(PendingSubmission),
    Invalid,
    AlreadySubmitting,
}

#[derive(Clone, Debug, Default)]
pub struct FormOptions {
    /// Caller-side safeguard for submit callbacks that never settle. `None` waits forever.
    pub submit_timeout: Option<Duration>,
    pub i18n: I18nManager,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CharacterCount {
    pub current: usize,
    pub max: usize,
}

impl CharacterCount {
    pub fn remaining(self) -> usize {
        self.max.saturating_sub(self.current)
    }

    pub fn is_over(self) -> bool {
        self.current > self.max
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot {
    pub values: FormValues,
    pub errors: BTreeMap<String, FieldError>,
    pub status: FormStatus,
    pub failure: Option<FailureCause>,
    pub success_overlay_visible: bool,
    pub submit_count: u32,
}

impl FormSnapshot {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn error_for(&self, name: &str) -> Option<&FieldError> {
        self.errors.get(name)
    }

    /// Form-level failure worth a banner. Validation failures are shown on the fields.
    pub fn banner_failure(&self) -> Option<&FailureCause> {
        self.failure.as_ref().filter(|cause| cause.is_retryable())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    InvalidStateTransition { from: FormStatus, to: FormStatus },
    UnknownField(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::InvalidStateTransition { from, to } => {
                write!(f, "invalid form status transition: {from:?} -> {to:?}")
            }
            FormError::UnknownField(name) => write!(f, "form has no field named `{name}`"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

struct FormState {
    id: FormId,
    initial_values: FormValues,
    values: FormValues,
    errors: BTreeMap<String, FieldError>,
    status: FormStatus,
    failure: Option<FailureCause>,
    success_overlay_visible: bool,
    submit_count: u32,
    ticket: SubmitTicket,
    detached: bool,
}

impl FormState {
    fn next_ticket(&mut self) -> SubmitTicket {
        self.ticket = SubmitTicket(self.ticket.0 + 1);
        self.ticket
    }
}

/// Owns the values, errors and submission lifecycle of one mounted form.
///
/// Clones share state. The engine performs no I/O: network delivery happens in the
/// callback handed to [`FormEngine::submit`].
#[derive(Clone)]
pub struct FormEngine {
    options: FormOptions,
    fields: Arc<[FieldDescriptor]>,
    state: Arc<RwLock<FormState>>,
}

impl FormEngine {
    pub fn new(fields: Vec<FieldDescriptor>, options: FormOptions) -> Self {
        let id = FormId::next();
        let mut seen = BTreeSet::new();
        for field in &fields {
            if !seen.insert(field.name_ref().to_string()) {
                log::warn!(
                    "{id}: duplicate field name `{}`; later fields share its value",
                    field.name_ref()
                );
            }
        }

        let initial_values = FormValues::empty_for(&fields);
        Self {
            options,
            fields: fields.into(),
            state: Arc::new(RwLock::new(FormState {
                id,
                values: initial_values.clone(),
                initial_values,
                errors: BTreeMap::new(),
                status: FormStatus::Idle,
                failure: None,
                success_overlay_visible: false,
                submit_count: 0,
                ticket: SubmitTicket(0),
                detached: false,
            })),
        }
    }

    pub fn for_model<M: FormModel>(options: FormOptions) -> Self {
        Self::new(M::descriptors(), options)
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name_ref().as_str() == name)
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn i18n(&self) -> &I18nManager {
        &self.options.i18n
    }

    /// Stores `value` under `name` and clears that field's error, if any.
    ///
    /// The form status is left untouched; errors only come back on the next submit.
    pub fn change_field(&self, name: &str, value: impl Into<String>) -> FormResult<()> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let value = field.normalize_input(value.into());

        let mut state = write_lock(&self.state, "changing field value")?;
        log::debug!("{}: field `{name}` changed ({} chars)", state.id, value.chars().count());
        state.values.set(name, value);
        state.errors.remove(name);
        Ok(())
    }

    pub fn value(&self, name: &str) -> FormResult<String> {
        let state = read_lock(&self.state, "reading field value")?;
        state
            .values
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Live counter for a bounded textarea; `None` for fields without one.
    pub fn character_count(&self, name: &str) -> FormResult<Option<CharacterCount>> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        if !field.has_counter() {
            return Ok(None);
        }
        let Some(max) = field.max_length_ref() else {
            return Ok(None);
        };
        let state = read_lock(&self.state, "reading character count")?;
        Ok(Some(CharacterCount {
            current: state.values.value(name).chars().count(),
            max,
        }))
    }

    /// Validates every field and, when all pass, moves the form to `Submitting`.
    ///
    /// A call made while a submission is in flight is a no-op.
    pub fn begin_submit(&self) -> FormResult<SubmitStart> {
        let mut state = write_lock(&self.state, "preparing submit")?;
        if state.status == FormStatus::Submitting {
            log::debug!("{}: submit ignored, already submitting", state.id);
            return Ok(SubmitStart::AlreadySubmitting);
        }
        state.submit_count = state.submit_count.saturating_add(1);

        let errors = validate_fields(&self.fields, &state.values, &self.options.i18n);
        if !errors.is_empty() {
            log::debug!("{}: {} field(s) failed validation", state.id, errors.len());
            transition_status(&mut state, FormStatus::Error)?;
            state.failure = Some(FailureCause::Validation {
                invalid_fields: errors.len(),
            });
            state.errors = errors;
            state.success_overlay_visible = false;
            return Ok(SubmitStart::Invalid);
        }

        transition_status(&mut state, FormStatus::Submitting)?;
        state.errors.clear();
        state.failure = None;
        state.success_overlay_visible = false;
        let ticket = state.next_ticket();
        log::info!("{}: submitting {} field(s)", state.id, state.values.len());
        Ok(SubmitStart::Ready(PendingSubmission {
            ticket,
            values: state.values.clone(),
        }))
    }

    /// Applies the result of the submission identified by `ticket`.
    ///
    /// Success resets the values and raises the success overlay. Failure keeps the
    /// user's input for a retry.
    pub fn complete_submit(
        &self,
        ticket: SubmitTicket,
        result: Result<(), FailureCause>,
    ) -> FormResult<SubmitOutcome> {
        let mut state = write_lock(&self.state, "completing submit")?;
        if state.detached || state.ticket != ticket || state.status != FormStatus::Submitting {
            log::warn!("{}: dropping stale completion for {ticket:?}", state.id);
            return Ok(SubmitOutcome::Stale);
        }

        match result {
            Ok(()) => {
                transition_status(&mut state, FormStatus::Success)?;
                state.values = state.initial_values.clone();
                state.errors.clear();
                state.failure = None;
                state.success_overlay_visible = true;
                log::info!("{}: submission succeeded", state.id);
                Ok(SubmitOutcome::Submitted)
            }
            Err(cause) => {
                transition_status(&mut state, FormStatus::Error)?;
                log::warn!("{}: submission failed: {cause:?}", state.id);
                state.failure = Some(cause);
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    /// Runs one full submit attempt: validation, the caller's callback, and the
    /// resulting status change. There is no retry.
    pub async fn submit<F, Fut, E>(&self, on_submit: F) -> FormResult<SubmitOutcome>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let pending = match self.begin_submit()? {
            SubmitStart::Ready(pending) => pending,
            SubmitStart::Invalid => return Ok(SubmitOutcome::Invalid),
            SubmitStart::AlreadySubmitting => return Ok(SubmitOutcome::AlreadySubmitting),
        };

        let result = await_delivery(on_submit(pending.values), self.options.submit_timeout).await;
        self.complete_submit(pending.ticket, result)
    }

    pub fn dismiss_success(&self) -> FormResult<()> {
        write_lock(&self.state, "dismissing success overlay")?.success_overlay_visible = false;
        Ok(())
    }

    /// Hides the success overlay only if it still belongs to the submission `ticket`.
    pub fn dismiss_success_if(&self, ticket: SubmitTicket) -> FormResult<bool> {
        let mut state = write_lock(&self.state, "auto-dismissing success overlay")?;
        if state.ticket != ticket || !state.success_overlay_visible {
            return Ok(false);
        }
        state.success_overlay_visible = false;
        Ok(true)
    }

    /// Shows the success overlay again for a form that already succeeded.
    pub fn show_success_overlay(&self) -> FormResult<bool> {
        let mut state = write_lock(&self.state, "showing success overlay")?;
        if state.status != FormStatus::Success {
            return Ok(false);
        }
        state.success_overlay_visible = true;
        Ok(true)
    }

    /// Clears a transport failure banner and returns the form to `Idle`.
    pub fn dismiss_failure(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "dismissing failure")?;
        if state
            .failure
            .as_ref()
            .is_some_and(FailureCause::is_retryable)
        {
            state.failure = None;
            transition_status(&mut state, FormStatus::Idle)?;
        }
        Ok(())
    }

    /// Starts a fresh session. A submission still in flight will be ignored when it settles.
    pub fn reset_session(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form session")?;
        state.values = state.initial_values.clone();
        state.errors.clear();
        state.failure = None;
        state.success_overlay_visible = false;
        state.submit_count = 0;
        state.next_ticket();
        transition_status(&mut state, FormStatus::Idle)?;
        Ok(())
    }

    /// Marks the form as unmounted. Later completions are dropped.
    pub fn detach(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "detaching form")?;
        state.detached = true;
        state.next_ticket();
        Ok(())
    }

    pub fn current_ticket(&self) -> FormResult<SubmitTicket> {
        Ok(read_lock(&self.state, "reading submit ticket")?.ticket)
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            values: state.values.clone(),
            errors: state.errors.clone(),
            status: state.status,
            failure: state.failure.clone(),
            success_overlay_visible: state.success_overlay_visible,
            submit_count: state.submit_count,
        })
    }
}

/// Awaits one delivery, mapping its error (or the elapsed `timeout`) to a [`FailureCause`].
pub async fn await_delivery<Fut, E>(
    delivery: Fut,
    timeout: Option<Duration>,
) -> Result<(), FailureCause>
where
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let Some(timeout) = timeout else {
        return delivery.await.map_err(transport_failure);
    };
    match future::select(Box::pin(delivery), Delay::new(timeout)).await {
        Either::Left((result, _)) => result.map_err(transport_failure),
        Either::Right(((), _)) => {
            log::warn!("submission did not settle within {timeout:?}");
            Err(FailureCause::TimedOut)
        }
    }
}

fn transport_failure<E: Display>(error: E) -> FailureCause {
    FailureCause::Transport {
        message: error.to_string().into(),
    }
}

fn transition_status(state: &mut FormState, next: FormStatus) -> FormResult<()> {
    let current = state.status;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (
            FormStatus::Idle | FormStatus::Success | FormStatus::Error,
            FormStatus::Submitting
        ) | (FormStatus::Idle | FormStatus::Success, FormStatus::Error)
            | (FormStatus::Submitting, FormStatus::Success)
            | (FormStatus::Submitting, FormStatus::Error)
            | (_, FormStatus::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.status = next;
    Ok(())
}

fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
