use super::*;
use futures::channel::oneshot;
use futures::executor::block_on;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::i18n::I18nManager;

fn options() -> FormOptions {
    FormOptions {
        submit_timeout: None,
        i18n: I18nManager::with_locale("en-US"),
    }
}

fn email_form() -> FormEngine {
    FormEngine::new(vec![FieldDescriptor::email("email").required(true)], options())
}

fn contact_form() -> FormEngine {
    FormEngine::new(
        vec![
            FieldDescriptor::text("name").label("Name").required(true),
            FieldDescriptor::email("email").label("Email").required(true),
            FieldDescriptor::text("company"),
            FieldDescriptor::textarea("message").max_length(10),
        ],
        options(),
    )
}

/// Submit callback that counts calls and records the last value map it saw.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<FormValues>>>,
}

impl Recorder {
    fn submit(&self, engine: &FormEngine, fail: bool) -> SubmitOutcome {
        let calls = self.calls.clone();
        let last = self.last.clone();
        block_on(engine.submit(move |values: FormValues| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            *last.lock().expect("recorder lock") = Some(values);
            if fail {
                Err("webhook unavailable")
            } else {
                Ok(())
            }
        }))
        .expect("submit runs")
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last(&self) -> FormValues {
        self.last
            .lock()
            .expect("recorder lock")
            .clone()
            .expect("submit callback was called")
    }
}

#[test]
fn invalid_email_blocks_submit() {
    let engine = email_form();
    let recorder = Recorder::default();
    engine
        .change_field("email", "not-an-email")
        .expect("set email");

    assert_eq!(recorder.submit(&engine, false), SubmitOutcome::Invalid);
    assert_eq!(recorder.calls(), 0);
    let snapshot = engine.snapshot().expect("snapshot");
    let error = snapshot.error_for("email").expect("email error");
    assert_eq!(error.kind(), FieldErrorKind::InvalidEmail);
    assert!(!error.message().is_empty());
    assert_eq!(snapshot.status, FormStatus::Error);
    assert_eq!(
        snapshot.failure,
        Some(FailureCause::Validation { invalid_fields: 1 })
    );
    assert!(snapshot.banner_failure().is_none());
}

#[test]
fn valid_email_is_delivered() {
    let engine = email_form();
    let recorder = Recorder::default();
    engine
        .change_field("email", "user@example.com")
        .expect("set email");

    assert_eq!(recorder.submit(&engine, false), SubmitOutcome::Submitted);
    assert_eq!(recorder.calls(), 1);
    assert_eq!(
        recorder.last(),
        FormValues::from_iter([("email", "user@example.com")])
    );
}

#[test]
fn untouched_optional_fields_are_submitted_as_empty() {
    let engine = FormEngine::new(
        vec![
            FieldDescriptor::text("company"),
            FieldDescriptor::email("email").required(true),
        ],
        options(),
    );
    let recorder = Recorder::default();
    engine
        .change_field("email", "user@example.com")
        .expect("set email");

    assert_eq!(recorder.submit(&engine, false), SubmitOutcome::Submitted);
    let submitted = recorder.last();
    assert_eq!(submitted.get("company"), Some(""));
    assert_eq!(submitted.get("email"), Some("user@example.com"));
}

#[test]
fn rejected_submit_keeps_values_and_allows_retry() {
    let engine = email_form();
    let recorder = Recorder::default();
    engine
        .change_field("email", "user@example.com")
        .expect("set email");

    assert_eq!(recorder.submit(&engine, true), SubmitOutcome::Failed);
    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FormStatus::Error);
    assert_eq!(snapshot.values.value("email"), "user@example.com");
    assert_eq!(
        snapshot.banner_failure(),
        Some(&FailureCause::Transport {
            message: "webhook unavailable".into()
        })
    );

    assert_eq!(recorder.submit(&engine, true), SubmitOutcome::Failed);
    assert_eq!(recorder.calls(), 2);
}

#[test]
fn every_empty_required_field_gets_an_error() {
    let engine = contact_form();
    let recorder = Recorder::default();

    assert_eq!(recorder.submit(&engine, false), SubmitOutcome::Invalid);
    assert_eq!(recorder.calls(), 0);
    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(
        snapshot.errors.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["email", "name"]
    );
    assert_eq!(
        snapshot.error_for("name").map(ToString::to_string),
        Some("Name is required".to_string())
    );
}

#[test]
fn editing_clears_only_that_fields_error() {
    let engine = contact_form();
    engine.begin_submit().expect("validate");

    engine.change_field("name", "A").expect("edit name");
    let snapshot = engine.snapshot().expect("snapshot");
    assert!(snapshot.error_for("name").is_none());
    assert!(snapshot.error_for("email").is_some());
    assert_eq!(snapshot.status, FormStatus::Error);

    engine.change_field("name", "").expect("clear name");
    assert!(
        engine
            .snapshot()
            .expect("snapshot")
            .error_for("name")
            .is_none()
    );
}

#[test]
fn success_resets_values_and_shows_overlay() {
    let engine = contact_form();
    let recorder = Recorder::default();
    engine.change_field("name", "Ada").expect("name");
    engine
        .change_field("email", "ada@example.com")
        .expect("email");
    engine.change_field("message", "hello").expect("message");

    assert_eq!(recorder.submit(&engine, false), SubmitOutcome::Submitted);
    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FormStatus::Success);
    assert!(snapshot.success_overlay_visible);
    assert!(snapshot.values.iter().all(|(_, value)| value.is_empty()));
    assert_eq!(snapshot.values.len(), 4);
    assert_eq!(
        engine.character_count("message").expect("count"),
        Some(CharacterCount {
            current: 0,
            max: 10
        })
    );

    engine.dismiss_success().expect("dismiss");
    let snapshot = engine.snapshot().expect("snapshot");
    assert!(!snapshot.success_overlay_visible);
    assert_eq!(snapshot.status, FormStatus::Success);
}

#[test]
fn character_count_tracks_every_edit() {
    let engine = contact_form();
    for text in ["", "h", "hé", "héllo wörld", "short"] {
        engine.change_field("message", text).expect("edit");
        let count = engine
            .character_count("message")
            .expect("count")
            .expect("message has a counter");
        assert_eq!(count.current, text.chars().count());
    }
    let count = engine
        .character_count("message")
        .expect("count")
        .expect("counter");
    assert_eq!(count.remaining(), 5);
    assert_eq!(engine.character_count("name").expect("count"), None);
}

#[test]
fn over_long_textarea_fails_validation() {
    let engine = contact_form();
    engine.change_field("name", "Ada").expect("name");
    engine
        .change_field("email", "ada@example.com")
        .expect("email");
    engine
        .change_field("message", "far too long for ten")
        .expect("message");

    assert!(matches!(
        engine.begin_submit().expect("validate"),
        SubmitStart::Invalid
    ));
    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(
        snapshot.error_for("message").map(FieldError::kind),
        Some(FieldErrorKind::TooLong { max: 10 })
    );
}

#[test]
fn unknown_field_is_rejected() {
    let engine = email_form();
    assert_eq!(
        engine.change_field("phone", "123"),
        Err(FormError::UnknownField("phone".into()))
    );
}

#[test]
fn second_submit_while_in_flight_is_ignored() {
    let engine = email_form();
    engine
        .change_field("email", "user@example.com")
        .expect("set email");

    let SubmitStart::Ready(pending) = engine.begin_submit().expect("begin") else {
        panic!("valid form should be ready to submit");
    };
    assert!(engine.snapshot().expect("snapshot").is_submitting());
    assert!(matches!(
        engine.begin_submit().expect("begin again"),
        SubmitStart::AlreadySubmitting
    ));
    let recorder = Recorder::default();
    assert_eq!(
        recorder.submit(&engine, false),
        SubmitOutcome::AlreadySubmitting
    );
    assert_eq!(recorder.calls(), 0);

    assert_eq!(
        engine
            .complete_submit(pending.ticket, Ok(()))
            .expect("complete"),
        SubmitOutcome::Submitted
    );
}

#[test]
fn completion_after_reset_is_stale() {
    let engine = email_form();
    engine
        .change_field("email", "user@example.com")
        .expect("set email");
    let SubmitStart::Ready(pending) = engine.begin_submit().expect("begin") else {
        panic!("valid form should be ready to submit");
    };

    engine.reset_session().expect("reset");
    engine.change_field("email", "other@example.com").expect("edit");
    assert_eq!(
        engine
            .complete_submit(pending.ticket, Ok(()))
            .expect("complete"),
        SubmitOutcome::Stale
    );
    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FormStatus::Idle);
    assert_eq!(snapshot.values.value("email"), "other@example.com");
}

#[test]
fn completion_after_detach_is_stale() {
    let engine = email_form();
    engine
        .change_field("email", "user@example.com")
        .expect("set email");
    let (release, gate) = oneshot::channel::<()>();

    let submitting = engine.clone();
    let worker = thread::spawn(move || {
        block_on(submitting.submit(move |_values| async move {
            gate.await.map_err(|_| "canceled")
        }))
        .expect("submit runs")
    });

    while !engine.snapshot().expect("snapshot").is_submitting() {
        thread::sleep(Duration::from_millis(1));
    }
    engine.detach().expect("detach");
    release.send(()).expect("worker is waiting");

    assert_eq!(worker.join().expect("worker joins"), SubmitOutcome::Stale);
    assert_eq!(
        engine.snapshot().expect("snapshot").status,
        FormStatus::Submitting
    );
}

#[test]
fn callback_that_never_settles_times_out() {
    let engine = FormEngine::new(
        vec![FieldDescriptor::email("email").required(true)],
        FormOptions {
            submit_timeout: Some(Duration::from_millis(20)),
            ..options()
        },
    );
    engine
        .change_field("email", "user@example.com")
        .expect("set email");

    let outcome = block_on(
        engine.submit(|_values| futures::future::pending::<Result<(), String>>()),
    )
    .expect("submit runs");
    assert_eq!(outcome, SubmitOutcome::Failed);
    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(snapshot.failure, Some(FailureCause::TimedOut));
    assert_eq!(snapshot.values.value("email"), "user@example.com");

    engine.dismiss_failure().expect("dismiss");
    let snapshot = engine.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FormStatus::Idle);
    assert!(snapshot.failure.is_none());
}

#[test]
fn resubmitting_after_success_starts_a_new_attempt() {
    let engine = email_form();
    let recorder = Recorder::default();
    engine
        .change_field("email", "user@example.com")
        .expect("set email");
    assert_eq!(recorder.submit(&engine, false), SubmitOutcome::Submitted);

    engine
        .change_field("email", "second@example.com")
        .expect("set email");
    assert_eq!(recorder.submit(&engine, false), SubmitOutcome::Submitted);
    assert_eq!(recorder.calls(), 2);
    assert_eq!(engine.snapshot().expect("snapshot").submit_count, 2);
}

#[test]
fn prefixed_field_stores_handle_without_prefix() {
    let engine = FormEngine::new(vec![FieldDescriptor::prefixed("instagram", "@")], options());
    engine
        .change_field("instagram", "@calm.studio")
        .expect("set handle");
    assert_eq!(engine.value("instagram").expect("value"), "calm.studio");
}

#[test]
fn duplicate_names_share_one_value() {
    let engine = FormEngine::new(
        vec![FieldDescriptor::text("name"), FieldDescriptor::text("name")],
        options(),
    );
    engine.change_field("name", "Ada").expect("set name");
    assert_eq!(engine.snapshot().expect("snapshot").values.len(), 1);
}
