use std::sync::Arc;
use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::{
    AnyElement, ClickEvent, Context, FocusHandle, FontWeight, InteractiveElement, IntoElement,
    KeyDownEvent, ParentElement, Render, SharedString, StatefulInteractiveElement, Styled, Window,
    anchored, deferred, div, point, px, svg,
};

use super::focus::FocusTrap;
use super::presentation::{CloseReason, FormShell, PresentationMode, SuccessLayer};
use super::text_edit::{EditBuffer, EditCommand};
use super::tokens::ShellTokens;
use crate::assets::{ALERT_ICON, CHECK_ICON, CLOSE_ICON};
use crate::form::{
    FailureCause, FieldDescriptor, FormSnapshot, SubmitOutcome, SubmitStart, SubmitTicket,
    await_delivery,
};
use crate::submit::SubmitAdapter;

struct FieldEditor {
    field: FieldDescriptor,
    buffer: EditBuffer,
    focus: FocusHandle,
}

/// gpui entity rendering a [`FormShell`] inline or as a modal.
///
/// Submissions run off the render path: the adapter future is awaited in a spawned
/// task and its result is applied back to the engine by ticket.
pub struct FormView {
    shell: FormShell,
    adapter: Arc<dyn SubmitAdapter>,
    tokens: ShellTokens,
    editors: Vec<FieldEditor>,
    submit_focus: FocusHandle,
    close_focus: FocusHandle,
    focus_trap: FocusTrap,
}

impl FormView {
    pub fn new(shell: FormShell, adapter: impl SubmitAdapter, cx: &mut Context<Self>) -> Self {
        let editors = shell
            .engine()
            .fields()
            .iter()
            .map(|field| FieldEditor {
                field: field.clone(),
                buffer: EditBuffer::default(),
                focus: cx.focus_handle(),
            })
            .collect::<Vec<_>>();
        let stops = editors.len() + if shell.mode().is_modal() { 2 } else { 1 };
        Self {
            shell,
            adapter: Arc::new(adapter),
            tokens: ShellTokens::default(),
            editors,
            submit_focus: cx.focus_handle(),
            close_focus: cx.focus_handle(),
            focus_trap: FocusTrap::new(stops),
        }
    }

    pub fn tokens(mut self, tokens: ShellTokens) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn shell(&self) -> &FormShell {
        &self.shell
    }

    pub fn open(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        match self.shell.open() {
            Ok(true) => {
                self.sync_editors();
                self.focus_stop(0, window, cx);
                cx.notify();
            }
            Ok(false) => {}
            Err(error) => log::error!("failed to open form: {error}"),
        }
    }

    pub fn close(&mut self, reason: CloseReason, cx: &mut Context<Self>) {
        match self.shell.close(reason) {
            Ok(true) => {
                self.focus_trap.blur();
                cx.notify();
            }
            Ok(false) => {}
            Err(error) => log::error!("failed to close form: {error}"),
        }
    }

    pub fn submit(&mut self, cx: &mut Context<Self>) {
        let engine = self.shell.engine().clone();
        let pending = match engine.begin_submit() {
            Ok(SubmitStart::Ready(pending)) => pending,
            Ok(SubmitStart::Invalid) => {
                cx.notify();
                return;
            }
            Ok(SubmitStart::AlreadySubmitting) => return,
            Err(error) => {
                log::error!("failed to start submission: {error}");
                return;
            }
        };
        cx.notify();

        let ticket = pending.ticket;
        let delivery = self.adapter.submit(pending.values);
        let timeout = engine.options().submit_timeout;
        cx.spawn(async move |this, cx| {
            let result = await_delivery(delivery, timeout).await;
            let _ = this.update(cx, |view, cx| view.finish_submit(ticket, result, cx));
        })
        .detach();
    }

    fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<(), FailureCause>,
        cx: &mut Context<Self>,
    ) {
        match self.shell.engine().complete_submit(ticket, result) {
            Ok(SubmitOutcome::Submitted) => {
                self.sync_editors();
                if let Some(delay) = self.shell.content().success.auto_dismiss {
                    self.schedule_auto_dismiss(ticket, delay, cx);
                }
            }
            Ok(_) => {}
            Err(error) => log::error!("failed to complete submission: {error}"),
        }
        cx.notify();
    }

    fn schedule_auto_dismiss(&self, ticket: SubmitTicket, delay: Duration, cx: &mut Context<Self>) {
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(delay).await;
            let _ = this.update(cx, |view, cx| {
                match view.shell.auto_dismiss_success(ticket) {
                    Ok(true) => cx.notify(),
                    Ok(false) => {}
                    Err(error) => log::error!("failed to dismiss success overlay: {error}"),
                }
            });
        })
        .detach();
    }

    fn dismiss_success(&mut self, cx: &mut Context<Self>) {
        if let Err(error) = self.shell.dismiss_success() {
            log::error!("failed to dismiss success overlay: {error}");
        }
        cx.notify();
    }

    fn dismiss_failure(&mut self, cx: &mut Context<Self>) {
        if let Err(error) = self.shell.engine().dismiss_failure() {
            log::error!("failed to dismiss failure banner: {error}");
        }
        cx.notify();
    }

    fn sync_editors(&mut self) {
        let engine = self.shell.engine();
        for editor in &mut self.editors {
            if let Ok(value) = engine.value(editor.field.name_ref()) {
                editor.buffer.sync(&value);
            }
        }
    }

    fn submit_stop(&self) -> usize {
        self.editors.len()
    }

    fn focus_stop(&mut self, index: usize, window: &mut Window, cx: &mut Context<Self>) {
        let Some(index) = self.focus_trap.focus(index) else {
            return;
        };
        let handle = match self.editors.get(index) {
            Some(editor) => &editor.focus,
            None if index == self.submit_stop() => &self.submit_focus,
            None => &self.close_focus,
        };
        window.focus(handle);
    }

    fn handle_key_down(&mut self, event: &KeyDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        let keystroke = &event.keystroke;
        if keystroke.modifiers.control || keystroke.modifiers.platform || keystroke.modifiers.alt
        {
            return;
        }

        match keystroke.key.as_str() {
            "escape" => {
                match self.shell.handle_escape() {
                    Ok(true) => cx.notify(),
                    Ok(false) => {}
                    Err(error) => log::error!("failed to close form: {error}"),
                }
                cx.stop_propagation();
                return;
            }
            "tab" => {
                let next = if keystroke.modifiers.shift {
                    self.focus_trap.previous()
                } else {
                    self.focus_trap.next()
                };
                if let Some(index) = next {
                    self.focus_stop(index, window, cx);
                }
                cx.stop_propagation();
                cx.notify();
                return;
            }
            _ => {}
        }

        match self.shell.accepts_input() {
            Ok(true) => {}
            Ok(false) => {
                cx.stop_propagation();
                return;
            }
            Err(error) => {
                log::error!("failed to read form state: {error}");
                return;
            }
        }

        let Some(index) = self.focus_trap.current() else {
            return;
        };
        if index == self.submit_stop() && matches!(keystroke.key.as_str(), "enter" | "space") {
            self.submit(cx);
            cx.stop_propagation();
            return;
        }
        let Some(editor) = self.editors.get_mut(index) else {
            return;
        };

        let multiline = editor.field.kind_ref().is_multiline();
        let Some(command) =
            EditCommand::from_key(&keystroke.key, keystroke.key_char.as_deref(), multiline)
        else {
            if keystroke.key == "enter" {
                self.submit(cx);
                cx.stop_propagation();
            }
            return;
        };

        if editor
            .buffer
            .apply(&command, editor.field.max_length_ref())
        {
            let engine = self.shell.engine();
            let name = editor.field.name_ref();
            if let Err(error) = engine.change_field(name, editor.buffer.value()) {
                log::error!("failed to update field `{name}`: {error}");
            } else if let Ok(stored) = engine.value(name) {
                editor.buffer.sync(&stored);
            }
        }
        cx.stop_propagation();
        cx.notify();
    }

    fn render_field(
        &self,
        index: usize,
        snapshot: &FormSnapshot,
        window: &Window,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let tokens = &self.tokens;
        let i18n = self.shell.engine().i18n();
        let editor = &self.editors[index];
        let field = &editor.field;
        let error = snapshot.error_for(field.name_ref());
        let focused = editor.focus.is_focused(window);
        let border = if error.is_some() {
            tokens.input_error_border
        } else if focused {
            tokens.input_focus_border
        } else {
            tokens.input_border
        };

        let mut label = div()
            .flex()
            .gap_1()
            .text_sm()
            .font_weight(FontWeight::MEDIUM)
            .text_color(tokens.title)
            .child(i18n.t(field.label_ref()));
        if field.is_required() {
            label = label.child(
                div()
                    .text_color(tokens.error_text)
                    .child(i18n.t("form.required_marker")),
            );
        }

        let mut input = div()
            .id(SharedString::from(format!("{}-input", field.id_ref())))
            .track_focus(&editor.focus)
            .flex()
            .flex_wrap()
            .items_start()
            .w_full()
            .px_3()
            .py_2()
            .rounded_md()
            .border_1()
            .border_color(border)
            .bg(tokens.input_bg)
            .text_sm()
            .text_color(tokens.title)
            .cursor_text()
            .when(field.kind_ref().is_multiline(), |input| input.min_h(px(96.0)))
            .on_click(cx.listener(move |this, _: &ClickEvent, window, cx| {
                this.focus_stop(index, window, cx);
                cx.notify();
            }));

        if let Some(prefix) = field.prefix_ref() {
            input = input.child(div().pr_1().text_color(tokens.muted).child(prefix.clone()));
        }

        if editor.buffer.is_empty() && !focused {
            if let Some(placeholder) = field.placeholder_ref() {
                input = input.child(div().text_color(tokens.muted).child(i18n.t(placeholder)));
            }
        } else {
            let (before, after) = editor.buffer.split_at_caret();
            input = input
                .child(before.to_string())
                .when(focused, |input| {
                    input.child(div().w(px(1.0)).h(px(16.0)).bg(tokens.input_focus_border))
                })
                .child(after.to_string());
        }

        let counter = self
            .shell
            .engine()
            .character_count(field.name_ref())
            .ok()
            .flatten()
            .map(|count| {
                let current = count.current.to_string();
                let max = count.max.to_string();
                div()
                    .text_xs()
                    .text_color(if count.is_over() {
                        tokens.error_text
                    } else {
                        tokens.muted
                    })
                    .child(i18n.t_with(
                        "form.counter",
                        &[("current", current.as_str()), ("max", max.as_str())],
                    ))
            });

        div()
            .id(SharedString::from(format!("{}-field", field.id_ref())))
            .flex()
            .flex_col()
            .gap_1()
            .child(label)
            .child(input)
            .when_some(error, |column, error| {
                column.child(
                    div()
                        .text_xs()
                        .text_color(tokens.error_text)
                        .child(error.message().clone()),
                )
            })
            .when_some(counter, |column, counter| {
                column.child(div().flex().justify_end().child(counter))
            })
            .into_any_element()
    }

    fn render_banner(&self, cause: &FailureCause, cx: &mut Context<Self>) -> AnyElement {
        let tokens = &self.tokens;
        let i18n = self.shell.engine().i18n();
        let message = match cause {
            FailureCause::TimedOut => i18n.t("form.error.timeout"),
            _ => i18n.t("form.error.transport"),
        };
        div()
            .id("form-failure-banner")
            .flex()
            .items_center()
            .justify_between()
            .gap_2()
            .px_3()
            .py_2()
            .rounded_md()
            .bg(tokens.banner_bg)
            .text_sm()
            .text_color(tokens.banner_fg)
            .child(
                div()
                    .flex()
                    .items_center()
                    .gap_2()
                    .child(svg().path(ALERT_ICON).size(px(16.0)).text_color(tokens.banner_fg))
                    .child(message),
            )
            .child(
                div()
                    .id("form-failure-dismiss")
                    .cursor_pointer()
                    .text_xs()
                    .child(i18n.t("form.error.dismiss"))
                    .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                        this.dismiss_failure(cx);
                    })),
            )
            .into_any_element()
    }

    fn render_submit(&self, snapshot: &FormSnapshot, window: &Window, cx: &mut Context<Self>) -> AnyElement {
        let tokens = &self.tokens;
        let i18n = self.shell.engine().i18n();
        let submitting = snapshot.is_submitting();
        let label = if submitting {
            i18n.t("form.submitting")
        } else {
            let key = self
                .shell
                .content()
                .submit_label
                .clone()
                .unwrap_or_else(|| "form.submit".into());
            i18n.t(&key)
        };

        div()
            .id("form-submit")
            .track_focus(&self.submit_focus)
            .flex()
            .justify_center()
            .w_full()
            .py_2()
            .rounded_md()
            .text_sm()
            .font_weight(FontWeight::SEMIBOLD)
            .text_color(tokens.accent_fg)
            .bg(if submitting {
                tokens.accent_disabled
            } else {
                tokens.accent
            })
            .when(self.submit_focus.is_focused(window), |button| {
                button.border_2().border_color(tokens.input_focus_border)
            })
            .when(!submitting, |button| {
                button
                    .cursor_pointer()
                    .on_click(cx.listener(|this, _: &ClickEvent, _, cx| this.submit(cx)))
            })
            .child(label)
            .into_any_element()
    }

    fn render_form(&self, snapshot: &FormSnapshot, window: &Window, cx: &mut Context<Self>) -> AnyElement {
        let tokens = &self.tokens;
        let i18n = self.shell.engine().i18n();
        let content = self.shell.content();

        let mut header = div().flex().items_start().justify_between().gap_4();
        if let Some(title) = &content.title {
            header = header.child(
                div()
                    .text_lg()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(tokens.title)
                    .child(i18n.t(title)),
            );
        }
        if self.shell.mode().is_modal() {
            header = header.child(
                div()
                    .id("form-close")
                    .track_focus(&self.close_focus)
                    .cursor_pointer()
                    .child(svg().path(CLOSE_ICON).size(px(16.0)).text_color(tokens.muted))
                    .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                        this.close(CloseReason::CloseButton, cx);
                    })),
            );
        }

        let fields = (0..self.editors.len())
            .map(|index| self.render_field(index, snapshot, window, cx))
            .collect::<Vec<_>>();

        div()
            .flex()
            .flex_col()
            .gap_4()
            .child(header)
            .when_some(content.description.as_ref(), |form, description| {
                form.child(div().text_sm().text_color(tokens.body).child(i18n.t(description)))
            })
            .when_some(snapshot.banner_failure(), |form, cause| {
                form.child(self.render_banner(cause, cx))
            })
            .children(fields)
            .child(self.render_submit(snapshot, window, cx))
            .when_some(content.footer_text.as_ref(), |form, footer| {
                form.child(
                    div()
                        .text_xs()
                        .text_color(tokens.muted)
                        .child(i18n.t(footer)),
                )
            })
            .into_any_element()
    }

    /// Confirmation layered over the whole viewport, not just the form bounds.
    fn render_success(&self, window: &Window, cx: &mut Context<Self>) -> AnyElement {
        let tokens = &self.tokens;
        let i18n = self.shell.engine().i18n();
        let success = &self.shell.content().success;
        let viewport = window.viewport_size();

        let card = div()
            .id("form-success")
            .occlude()
            .flex()
            .flex_col()
            .items_center()
            .gap_3()
            .p_8()
            .rounded(tokens.panel_radius)
            .bg(tokens.panel_bg)
            .border_1()
            .border_color(tokens.panel_border)
            .child(svg().path(CHECK_ICON).size(px(48.0)).text_color(tokens.success_icon))
            .child(
                div()
                    .text_lg()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(tokens.title)
                    .child(i18n.t(&success.title)),
            )
            .child(div().text_sm().text_color(tokens.body).child(i18n.t(&success.message)))
            .child(
                div()
                    .id("form-success-dismiss")
                    .mt_2()
                    .px_4()
                    .py_2()
                    .rounded_md()
                    .cursor_pointer()
                    .bg(tokens.accent)
                    .text_color(tokens.accent_fg)
                    .text_sm()
                    .child(i18n.t(&success.button_text))
                    .on_click(cx.listener(|this, _: &ClickEvent, _, cx| this.dismiss_success(cx))),
            );

        let layer = div()
            .occlude()
            .flex()
            .items_center()
            .justify_center()
            .bg(tokens.success_overlay_bg)
            .child(card);

        match self.shell.mode().success_layer() {
            SuccessLayer::Deferred => deferred(
                anchored()
                    .position(point(px(0.0), px(0.0)))
                    .child(layer.w(viewport.width).h(viewport.height)),
            )
            .priority(30)
            .into_any_element(),
            SuccessLayer::InPlace => layer
                .absolute()
                .top_0()
                .left_0()
                .size_full()
                .into_any_element(),
        }
    }
}

impl Render for FormView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !self.shell.is_open() {
            return div().into_any_element();
        }
        let snapshot = match self.shell.engine().snapshot() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log::error!("failed to render form: {error}");
                return div().into_any_element();
            }
        };

        let form = self.render_form(&snapshot, window, cx);
        let success = snapshot
            .success_overlay_visible
            .then(|| self.render_success(window, cx));
        let tokens = &self.tokens;

        let root = div()
            .id("form-shell")
            .on_key_down(cx.listener(Self::handle_key_down));

        match self.shell.mode() {
            PresentationMode::Inline => root
                .w_full()
                .p_6()
                .rounded(tokens.panel_radius)
                .border_1()
                .border_color(tokens.panel_border)
                .bg(tokens.panel_bg)
                .child(form)
                .children(success)
                .into_any_element(),
            PresentationMode::Modal(_) => {
                let viewport = window.viewport_size();
                let backdrop = div()
                    .id("form-backdrop")
                    .absolute()
                    .top_0()
                    .left_0()
                    .size_full()
                    .bg(tokens.backdrop)
                    .on_click(cx.listener(|this, _: &ClickEvent, _, cx| {
                        match this.shell.handle_backdrop_click() {
                            Ok(true) => cx.notify(),
                            Ok(false) => {}
                            Err(error) => log::error!("failed to close form: {error}"),
                        }
                    }));
                let panel = div()
                    .id("form-panel")
                    .occlude()
                    .w(tokens.panel_width)
                    .max_w_full()
                    .p_6()
                    .rounded(tokens.panel_radius)
                    .border_1()
                    .border_color(tokens.panel_border)
                    .bg(tokens.panel_bg)
                    .child(form);

                deferred(
                    anchored().position(point(px(0.0), px(0.0))).child(
                        root.w(viewport.width)
                            .h(viewport.height)
                            .flex()
                            .items_center()
                            .justify_center()
                            .child(backdrop)
                            .child(panel)
                            .children(success),
                    ),
                )
                .priority(20)
                .into_any_element()
            }
        }
    }
}
