//! End-to-end dictation session behaviour with a scripted recognizer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use scribe_dictation::{
    DictationConfig, DictationError, DictationSession, DictationState, FatalReason, RawSegment,
    RecognitionErrorKind, RecognizerError, RecognizerEvent, SessionStep, SpeechRecognizer,
    normalize_results, restart_task,
};

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Recognizer whose start count is observable from outside the session.
#[derive(Clone, Default)]
struct ScriptedRecognizer {
    starts: Rc<Cell<usize>>,
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&mut self) -> Result<(), RecognizerError> {
        self.starts.set(self.starts.get() + 1);
        Ok(())
    }

    fn stop(&mut self) {}
}

fn config() -> DictationConfig {
    DictationConfig::default().with_restart_delay(Duration::from_millis(5))
}

fn final_result(index: usize, text: &str) -> RecognizerEvent {
    RecognizerEvent::FinalResult {
        index,
        text: text.into(),
    }
}

#[test]
fn finalized_segments_emitted_once_in_order() {
    init_test_tracing();
    let mut session = DictationSession::new(Some(ScriptedRecognizer::default()), config());
    session.start().unwrap();

    let words = ["one", "two", "three", "four", "five"];
    let mut out = Vec::<String>::new();
    for (i, word) in words.iter().enumerate() {
        session
            .handle_event(
                RecognizerEvent::PartialResult {
                    index: i,
                    text: "…".into(),
                },
                &mut out,
            )
            .unwrap();
        session.handle_event(final_result(i, word), &mut out).unwrap();
    }

    let expected: Vec<String> = words.iter().map(|w| format!("{w} ")).collect();
    assert_eq!(out, expected);
    assert_eq!(session.result_cursor(), words.len());
}

#[test]
fn hello_world_reaches_sink_with_delimiters() {
    let mut session = DictationSession::new(Some(ScriptedRecognizer::default()), config());
    session.toggle().unwrap();

    let mut out = Vec::<String>::new();
    let results = [RawSegment::new("hello", true), RawSegment::new("wor", false)];
    for event in normalize_results(0, &results) {
        session.handle_event(event, &mut out).unwrap();
    }
    let results = [RawSegment::new("hello", true), RawSegment::new("world", true)];
    for event in normalize_results(1, &results) {
        session.handle_event(event, &mut out).unwrap();
    }

    assert_eq!(out, vec!["hello ".to_string(), "world ".to_string()]);
}

#[test]
fn permission_denied_disables_control() {
    let recognizer = ScriptedRecognizer::default();
    let starts = recognizer.starts.clone();
    let mut session = DictationSession::new(Some(recognizer), config());
    session.start().unwrap();

    let mut out = String::new();
    let res = session.handle_event(
        RecognizerEvent::Error(RecognitionErrorKind::from_code("not-allowed")),
        &mut out,
    );
    assert_eq!(res, Err(DictationError::NotAllowed));
    assert_eq!(session.state(), &DictationState::Failed(FatalReason::NotAllowed));
    assert!(!session.continuation());
    assert!(!session.is_control_enabled());

    // The trailing end must not schedule a restart.
    let step = session.handle_event(RecognizerEvent::Ended, &mut out).unwrap();
    assert_eq!(step, SessionStep::Continue);
    assert_eq!(session.start(), Err(DictationError::NotAllowed));
    assert_eq!(starts.get(), 1);
}

#[tokio::test]
async fn unexpected_end_restarts_after_delay() {
    init_test_tracing();
    let recognizer = ScriptedRecognizer::default();
    let starts = recognizer.starts.clone();
    let session = Rc::new(RefCell::new(DictationSession::new(Some(recognizer), config())));
    session.borrow_mut().start().unwrap();

    let mut out = Vec::<String>::new();
    {
        let mut s = session.borrow_mut();
        s.handle_event(final_result(0, "before"), &mut out).unwrap();
        s.handle_event(final_result(1, "restart"), &mut out).unwrap();
        assert_eq!(s.result_cursor(), 2);
    }

    let step = session
        .borrow_mut()
        .handle_event(RecognizerEvent::Ended, &mut out)
        .unwrap();
    let SessionStep::RestartAfter(delay) = step else {
        panic!("expected a restart, got {step:?}");
    };
    assert_eq!(session.borrow().state(), &DictationState::Restarting);

    restart_task(Rc::downgrade(&session), delay).await.unwrap();

    assert_eq!(session.borrow().state(), &DictationState::Listening);
    assert_eq!(session.borrow().result_cursor(), 0);
    assert_eq!(starts.get(), 2);

    // The new recognizer run numbers its results from zero again.
    session
        .borrow_mut()
        .handle_event(final_result(0, "after"), &mut out)
        .unwrap();
    assert_eq!(out, vec!["before ", "restart ", "after "]);
}

#[tokio::test]
async fn stop_during_delay_wins_the_race() {
    let recognizer = ScriptedRecognizer::default();
    let starts = recognizer.starts.clone();
    let session = Rc::new(RefCell::new(DictationSession::new(Some(recognizer), config())));
    session.borrow_mut().start().unwrap();

    let mut out = String::new();
    let step = session
        .borrow_mut()
        .handle_event(RecognizerEvent::Ended, &mut out)
        .unwrap();
    let SessionStep::RestartAfter(delay) = step else {
        panic!("expected a restart");
    };

    let task = restart_task(Rc::downgrade(&session), delay);
    session.borrow_mut().stop();
    task.await.unwrap();

    assert_eq!(session.borrow().state(), &DictationState::Idle);
    assert_eq!(starts.get(), 1);
}

#[tokio::test]
async fn restart_task_outliving_session_is_harmless() {
    let session = Rc::new(RefCell::new(DictationSession::new(
        Some(ScriptedRecognizer::default()),
        config(),
    )));
    let task = restart_task(Rc::downgrade(&session), Duration::from_millis(1));
    drop(session);
    assert_eq!(task.await, Ok(()));
}
