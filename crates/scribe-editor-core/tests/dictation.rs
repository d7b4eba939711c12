//! Dictated text flowing through the router into the title or the body.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use scribe_dictation::{
    DictationConfig, DictationSession, DictationState, DictationToggle, RecognizerError,
    RecognizerEvent, SessionStep, SpeechRecognizer, restart_task,
};
use scribe_editor_core::{ActiveField, ActiveFieldRouter, DocumentSyncEngine, RoutedTranscript};

#[derive(Default)]
struct FakeRecognizer;

impl SpeechRecognizer for FakeRecognizer {
    fn start(&mut self) -> Result<(), RecognizerError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

fn final_result(index: usize, text: &str) -> RecognizerEvent {
    RecognizerEvent::FinalResult {
        index,
        text: text.into(),
    }
}

struct Note {
    router: ActiveFieldRouter,
    title: String,
    body: DocumentSyncEngine,
    emitted: Rc<RefCell<Vec<String>>>,
}

impl Note {
    fn new(title: &str, body: &str) -> Self {
        let emitted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&emitted);
        Self {
            router: ActiveFieldRouter::new(),
            title: title.to_string(),
            body: DocumentSyncEngine::new(body, move |v| sink.borrow_mut().push(v.to_string())),
            emitted,
        }
    }

    fn feed<R: SpeechRecognizer>(&mut self, session: &mut DictationSession<R>, event: RecognizerEvent) -> SessionStep {
        let mut sink = RoutedTranscript {
            router: &self.router,
            title: &mut self.title,
            body: &mut self.body,
        };
        session.handle_event(event, &mut sink).unwrap()
    }
}

#[test]
fn dictation_into_body_lands_at_cursor() {
    let mut note = Note::new("", "Buy  today");
    let focus = note.body.focus();
    note.router.handle(focus);
    note.body.set_cursor_offset(4);

    let mut session = DictationSession::new(Some(FakeRecognizer), DictationConfig::default());
    session.toggle().unwrap();
    note.feed(&mut session, final_result(0, "hello"));
    note.feed(&mut session, final_result(1, "world"));

    insta::assert_snapshot!(note.body.value(), @"Buy hello world  today");
    assert_eq!(note.body.cursor_offset(), Some(16));
    assert_eq!(note.emitted.borrow().len(), 2);
    assert_eq!(note.title, "");
}

#[test]
fn toggle_press_keeps_title_as_target() {
    let mut note = Note::new("Groceries", "");
    let mut toggle = DictationToggle::from_config(&DictationConfig::default());

    note.router.on_focus(ActiveField::Title);
    // Pressing the toggle steals focus from the title.
    note.router.on_toggle_press_start();
    note.router.on_blur(ActiveField::Title);
    assert!(toggle.press());

    let mut session = DictationSession::new(Some(FakeRecognizer), DictationConfig::default());
    session.toggle().unwrap();
    note.feed(&mut session, final_result(0, ":"));
    note.feed(&mut session, final_result(1, "milk"));

    assert_eq!(note.title, "Groceries: milk ");
    assert!(note.body.is_empty());
    assert!(note.emitted.borrow().is_empty());
}

#[test]
fn plain_blur_sends_dictation_to_body() {
    let mut note = Note::new("Groceries", "");
    note.router.on_focus(ActiveField::Title);
    note.router.on_blur(ActiveField::Title);

    let mut session = DictationSession::new(Some(FakeRecognizer), DictationConfig::default());
    session.start().unwrap();
    note.feed(&mut session, final_result(0, "eggs"));

    assert_eq!(note.title, "Groceries");
    assert_eq!(note.body.value(), "eggs ");
}

#[tokio::test]
async fn restart_continues_routing_without_repeats() {
    let mut note = Note::new("", "");
    let config = DictationConfig::default().with_restart_delay(Duration::from_millis(5));
    let session = Rc::new(RefCell::new(DictationSession::new(Some(FakeRecognizer), config)));
    session.borrow_mut().start().unwrap();

    note.feed(&mut session.borrow_mut(), final_result(0, "first"));
    let step = note.feed(&mut session.borrow_mut(), RecognizerEvent::Ended);
    let SessionStep::RestartAfter(delay) = step else {
        panic!("session did not ask for a restart");
    };
    assert_eq!(*session.borrow().state(), DictationState::Restarting);

    restart_task(Rc::downgrade(&session), delay).await.unwrap();
    assert_eq!(*session.borrow().state(), DictationState::Listening);
    assert_eq!(session.borrow().result_cursor(), 0);

    // A fresh recognizer run numbers its results from zero again.
    note.feed(&mut session.borrow_mut(), final_result(0, "second"));
    assert_eq!(note.body.value(), "first second ");
}
