use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use gpui::SharedString;

use super::scroll_lock::{ScrollLock, ScrollLockGuard};
use crate::form::{FormEngine, FormResult, SubmitTicket};

/// Confirmation shown after a successful submission. Strings are i18n keys or literals.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuccessMessage {
    pub title: SharedString,
    pub message: SharedString,
    pub button_text: SharedString,
    /// Hide the overlay on its own after this long.
    pub auto_dismiss: Option<Duration>,
}

impl Default for SuccessMessage {
    fn default() -> Self {
        Self {
            title: "form.success.title".into(),
            message: "form.success.message".into(),
            button_text: "form.success.button".into(),
            auto_dismiss: None,
        }
    }
}

impl SuccessMessage {
    pub fn new(title: impl Into<SharedString>, message: impl Into<SharedString>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn button_text(mut self, value: impl Into<SharedString>) -> Self {
        self.button_text = value.into();
        self
    }

    pub fn auto_dismiss(mut self, value: Duration) -> Self {
        self.auto_dismiss = Some(value);
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModalBehavior {
    /// Start a fresh session every time the modal opens.
    pub reset_on_open: bool,
    pub close_on_escape: bool,
    pub close_on_backdrop: bool,
}

impl Default for ModalBehavior {
    fn default() -> Self {
        Self {
            reset_on_open: true,
            close_on_escape: true,
            close_on_backdrop: true,
        }
    }
}

impl ModalBehavior {
    pub fn reset_on_open(mut self, value: bool) -> Self {
        self.reset_on_open = value;
        self
    }

    pub fn close_on_escape(mut self, value: bool) -> Self {
        self.close_on_escape = value;
        self
    }

    pub fn close_on_backdrop(mut self, value: bool) -> Self {
        self.close_on_backdrop = value;
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PresentationMode {
    Inline,
    Modal(ModalBehavior),
}

impl PresentationMode {
    pub fn is_modal(self) -> bool {
        matches!(self, Self::Modal(_))
    }

    /// A modal is already drawn in the deferred overlay pass, so its success layer is a
    /// plain absolute child. Inline forms need their own deferred layer to escape the
    /// page flow.
    pub fn success_layer(self) -> SuccessLayer {
        match self {
            Self::Inline => SuccessLayer::Deferred,
            Self::Modal(_) => SuccessLayer::InPlace,
        }
    }
}

/// How the success confirmation is stacked above the rest of the window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SuccessLayer {
    Deferred,
    InPlace,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShellContent {
    pub title: Option<SharedString>,
    pub description: Option<SharedString>,
    pub footer_text: Option<SharedString>,
    pub submit_label: Option<SharedString>,
    pub success: SuccessMessage,
}

impl ShellContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, value: impl Into<SharedString>) -> Self {
        self.title = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<SharedString>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn footer_text(mut self, value: impl Into<SharedString>) -> Self {
        self.footer_text = Some(value.into());
        self
    }

    pub fn submit_label(mut self, value: impl Into<SharedString>) -> Self {
        self.submit_label = Some(value.into());
        self
    }

    pub fn success(mut self, value: SuccessMessage) -> Self {
        self.success = value;
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CloseReason {
    Programmatic,
    BackdropClick,
    CloseButton,
    EscapeKey,
    SuccessDismissed,
}

pub type CloseHandler = Arc<dyn Fn(CloseReason) + Send + Sync>;

/// Headless presentation state around one [`FormEngine`]: open/closed, scroll lock
/// ownership and the `on_close` contract. The gpui view renders from it.
pub struct FormShell {
    engine: FormEngine,
    mode: PresentationMode,
    content: ShellContent,
    open: bool,
    scroll_lock: ScrollLock,
    lock_guard: Option<ScrollLockGuard>,
    on_close: Option<CloseHandler>,
}

impl FormShell {
    pub fn new(engine: FormEngine, mode: PresentationMode, content: ShellContent) -> Self {
        Self {
            engine,
            mode,
            content,
            open: !mode.is_modal(),
            scroll_lock: ScrollLock::new(),
            lock_guard: None,
            on_close: None,
        }
    }

    pub fn inline(engine: FormEngine, content: ShellContent) -> Self {
        Self::new(engine, PresentationMode::Inline, content)
    }

    pub fn modal(engine: FormEngine, behavior: ModalBehavior, content: ShellContent) -> Self {
        Self::new(engine, PresentationMode::Modal(behavior), content)
    }

    pub fn scroll_lock(mut self, lock: ScrollLock) -> Self {
        self.scroll_lock = lock;
        self
    }

    pub fn on_close(mut self, handler: impl Fn(CloseReason) + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(handler));
        self
    }

    pub fn engine(&self) -> &FormEngine {
        &self.engine
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    pub fn content(&self) -> &ShellContent {
        &self.content
    }

    /// Inline shells are always open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn holds_scroll_lock(&self) -> bool {
        self.lock_guard.is_some()
    }

    /// Whether keystrokes may edit fields or submit. Input is held while a submission
    /// is in flight and while the success confirmation covers the form.
    pub fn accepts_input(&self) -> FormResult<bool> {
        if !self.open {
            return Ok(false);
        }
        let snapshot = self.engine.snapshot()?;
        Ok(!snapshot.is_submitting() && !snapshot.success_overlay_visible)
    }

    /// Opens a modal shell. Returns `false` when already open or inline.
    pub fn open(&mut self) -> FormResult<bool> {
        let PresentationMode::Modal(behavior) = self.mode else {
            return Ok(false);
        };
        if self.open {
            return Ok(false);
        }

        if behavior.reset_on_open {
            self.engine.reset_session()?;
        } else {
            self.engine.show_success_overlay()?;
        }
        self.lock_guard = Some(self.scroll_lock.acquire());
        self.open = true;
        log::debug!("{}: modal opened", self.engine.form_id()?);
        Ok(true)
    }

    /// Closes a modal shell and reports `reason` to the `on_close` handler.
    ///
    /// The session survives the close, so a success is not forgotten.
    pub fn close(&mut self, reason: CloseReason) -> FormResult<bool> {
        if !self.mode.is_modal() || !self.open {
            return Ok(false);
        }
        self.open = false;
        self.lock_guard = None;
        self.engine.dismiss_success()?;
        log::debug!("{}: modal closed ({reason:?})", self.engine.form_id()?);
        if let Some(handler) = &self.on_close {
            handler(reason);
        }
        Ok(true)
    }

    pub fn handle_escape(&mut self) -> FormResult<bool> {
        match self.mode {
            PresentationMode::Modal(behavior) if behavior.close_on_escape => {
                self.close(CloseReason::EscapeKey)
            }
            _ => Ok(false),
        }
    }

    pub fn handle_backdrop_click(&mut self) -> FormResult<bool> {
        match self.mode {
            PresentationMode::Modal(behavior) if behavior.close_on_backdrop => {
                self.close(CloseReason::BackdropClick)
            }
            _ => Ok(false),
        }
    }

    /// Closes the success overlay. In modal mode this also closes the modal.
    pub fn dismiss_success(&mut self) -> FormResult<()> {
        self.engine.dismiss_success()?;
        self.close(CloseReason::SuccessDismissed)?;
        Ok(())
    }

    /// Timer-driven variant of [`Self::dismiss_success`]; does nothing when the overlay
    /// already belongs to a different submission or was closed by the user.
    pub fn auto_dismiss_success(&mut self, ticket: SubmitTicket) -> FormResult<bool> {
        if !self.engine.dismiss_success_if(ticket)? {
            return Ok(false);
        }
        self.close(CloseReason::SuccessDismissed)?;
        Ok(true)
    }
}

impl Debug for FormShell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormShell")
            .field("mode", &self.mode)
            .field("open", &self.open)
            .field("holds_scroll_lock", &self.lock_guard.is_some())
            .finish()
    }
}

impl Drop for FormShell {
    fn drop(&mut self) {
        if let Err(error) = self.engine.detach() {
            log::warn!("failed to detach form on unmount: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::executor::block_on;

    use super::*;
    use crate::form::{FieldDescriptor, FormOptions, FormStatus, SubmitOutcome, SubmitStart};
    use crate::i18n::I18nManager;

    fn engine() -> FormEngine {
        FormEngine::new(
            vec![FieldDescriptor::email("email").required(true)],
            FormOptions {
                submit_timeout: None,
                i18n: I18nManager::with_locale("en-US"),
            },
        )
    }

    fn succeed(engine: &FormEngine) {
        engine
            .change_field("email", "user@example.com")
            .expect("field exists");
        let outcome = block_on(engine.submit(|_| async { Ok::<(), String>(()) }))
            .expect("submit runs");
        assert_eq!(outcome, SubmitOutcome::Submitted);
    }

    #[test]
    fn inline_shell_is_always_open_and_ignores_close() {
        let mut shell = FormShell::inline(engine(), ShellContent::new());
        assert!(shell.is_open());
        assert!(!shell.open().expect("open"));
        assert!(!shell.handle_escape().expect("escape"));
        assert!(shell.is_open());
        assert!(!shell.holds_scroll_lock());
    }

    #[test]
    fn modal_holds_scroll_lock_while_open() {
        let lock = ScrollLock::new();
        let mut shell = FormShell::modal(engine(), ModalBehavior::default(), ShellContent::new())
            .scroll_lock(lock.clone());
        assert!(!lock.is_locked());

        assert!(shell.open().expect("open"));
        assert!(lock.is_locked());
        assert!(shell.close(CloseReason::CloseButton).expect("close"));
        assert!(!lock.is_locked());
    }

    #[test]
    fn dropping_an_open_modal_releases_the_lock() {
        let lock = ScrollLock::new();
        let mut shell = FormShell::modal(engine(), ModalBehavior::default(), ShellContent::new())
            .scroll_lock(lock.clone());
        shell.open().expect("open");
        drop(shell);
        assert!(!lock.is_locked());
    }

    #[test]
    fn escape_and_backdrop_follow_behavior_flags() {
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = reasons.clone();
        let behavior = ModalBehavior::default().close_on_backdrop(false);
        let mut shell = FormShell::modal(engine(), behavior, ShellContent::new())
            .on_close(move |reason| sink.lock().expect("reasons").push(reason));

        shell.open().expect("open");
        assert!(!shell.handle_backdrop_click().expect("backdrop"));
        assert!(shell.is_open());
        assert!(shell.handle_escape().expect("escape"));
        assert!(!shell.is_open());
        assert_eq!(*reasons.lock().expect("reasons"), vec![CloseReason::EscapeKey]);
    }

    #[test]
    fn dismissing_success_in_modal_mode_calls_on_close() {
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = reasons.clone();
        let mut shell = FormShell::modal(engine(), ModalBehavior::default(), ShellContent::new())
            .on_close(move |reason| sink.lock().expect("reasons").push(reason));
        shell.open().expect("open");
        succeed(shell.engine());

        shell.dismiss_success().expect("dismiss");
        assert!(!shell.is_open());
        assert_eq!(
            *reasons.lock().expect("reasons"),
            vec![CloseReason::SuccessDismissed]
        );
        let snapshot = shell.engine().snapshot().expect("snapshot");
        assert_eq!(snapshot.status, FormStatus::Success);
        assert!(!snapshot.success_overlay_visible);
    }

    #[test]
    fn reopening_without_reset_shows_previous_success() {
        let behavior = ModalBehavior::default().reset_on_open(false);
        let mut shell = FormShell::modal(engine(), behavior, ShellContent::new());
        shell.open().expect("open");
        succeed(shell.engine());
        shell.close(CloseReason::CloseButton).expect("close");

        shell.open().expect("reopen");
        let snapshot = shell.engine().snapshot().expect("snapshot");
        assert_eq!(snapshot.status, FormStatus::Success);
        assert!(snapshot.success_overlay_visible);
    }

    #[test]
    fn reopening_with_reset_starts_a_fresh_session() {
        let mut shell = FormShell::modal(engine(), ModalBehavior::default(), ShellContent::new());
        shell.open().expect("open");
        shell
            .engine()
            .change_field("email", "half-typed")
            .expect("field exists");
        shell.close(CloseReason::Programmatic).expect("close");

        shell.open().expect("reopen");
        let snapshot = shell.engine().snapshot().expect("snapshot");
        assert_eq!(snapshot.status, FormStatus::Idle);
        assert_eq!(snapshot.values.value("email"), "");
    }

    #[test]
    fn auto_dismiss_ignores_outdated_tickets() {
        let mut shell = FormShell::modal(engine(), ModalBehavior::default(), ShellContent::new());
        shell.open().expect("open");
        succeed(shell.engine());
        let ticket = shell.engine().current_ticket().expect("ticket");

        assert!(
            !shell
                .auto_dismiss_success(SubmitTicket(ticket.0 + 1))
                .expect("dismiss")
        );
        assert!(shell.is_open());
        assert!(shell.auto_dismiss_success(ticket).expect("dismiss"));
        assert!(!shell.is_open());
    }

    #[test]
    fn success_layer_is_not_deferred_twice_inside_a_modal() {
        assert_eq!(PresentationMode::Inline.success_layer(), SuccessLayer::Deferred);
        assert_eq!(
            PresentationMode::Modal(ModalBehavior::default()).success_layer(),
            SuccessLayer::InPlace
        );
    }

    #[test]
    fn input_is_held_while_submitting_and_under_the_success_overlay() {
        let mut shell = FormShell::inline(engine(), ShellContent::new());
        shell
            .engine()
            .change_field("email", "user@example.com")
            .expect("field exists");
        assert!(shell.accepts_input().expect("input"));

        let SubmitStart::Ready(pending) = shell.engine().begin_submit().expect("begin") else {
            panic!("form should be valid");
        };
        assert!(!shell.accepts_input().expect("input"));

        shell
            .engine()
            .complete_submit(pending.ticket, Ok(()))
            .expect("complete");
        assert!(shell.engine().snapshot().expect("snapshot").success_overlay_visible);
        assert!(!shell.accepts_input().expect("input"));

        shell.dismiss_success().expect("dismiss");
        assert!(shell.accepts_input().expect("input"));
    }

    #[test]
    fn closed_modal_takes_no_input() {
        let mut shell = FormShell::modal(engine(), ModalBehavior::default(), ShellContent::new());
        assert!(!shell.accepts_input().expect("input"));
        shell.open().expect("open");
        assert!(shell.accepts_input().expect("input"));
    }
}
