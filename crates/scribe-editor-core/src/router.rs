//! Routing dictation output to whichever field the user was editing.
//!
//! Tapping the dictation toggle steals focus, so the field the user was in
//! blurs right before the toggle press completes. The router therefore lets
//! the toggle arm a one-shot flag on press-start that makes the next blur
//! keep the current target instead of falling back to the body.

use scribe_dictation::TranscriptSink;

use crate::sync::DocumentSyncEngine;

/// The field dictation writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveField {
    /// The plain-text title field.
    Title,
    /// The rich body document.
    #[default]
    Body,
}

/// A focus change from one of the routed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSignal {
    Focus(ActiveField),
    Blur(ActiveField),
}

/// Tracks the active field from focus and blur signals.
#[derive(Debug, Clone, Default)]
pub struct ActiveFieldRouter {
    active: ActiveField,
    suppress_next_blur: bool,
}

impl ActiveFieldRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ActiveField {
        self.active
    }

    /// Whether the next blur will be ignored.
    pub fn is_blur_suppressed(&self) -> bool {
        self.suppress_next_blur
    }

    pub fn on_focus(&mut self, field: ActiveField) {
        tracing::trace!(target: "scribe::router", ?field, "focus");
        self.active = field;
    }

    /// A field lost focus. Resets to `Body` unless a toggle press armed the
    /// suppression flag, which this consumes either way.
    pub fn on_blur(&mut self, field: ActiveField) {
        if std::mem::take(&mut self.suppress_next_blur) {
            tracing::trace!(target: "scribe::router", ?field, kept = ?self.active, "blur suppressed");
            return;
        }
        self.active = ActiveField::Body;
    }

    /// The user started pressing the dictation toggle.
    pub fn on_toggle_press_start(&mut self) {
        self.suppress_next_blur = true;
    }

    pub fn handle(&mut self, signal: FocusSignal) {
        match signal {
            FocusSignal::Focus(field) => self.on_focus(field),
            FocusSignal::Blur(field) => self.on_blur(field),
        }
    }

    /// Deliver text to the active field.
    pub fn route(&self, text: &str, title: &mut String, body: &mut DocumentSyncEngine) -> ActiveField {
        match self.active {
            ActiveField::Title => title.push_str(text),
            ActiveField::Body => {
                body.insert_at_cursor(text);
            }
        }
        self.active
    }
}

/// Adapter letting a dictation session write through the router.
pub struct RoutedTranscript<'a> {
    pub router: &'a ActiveFieldRouter,
    pub title: &'a mut String,
    pub body: &'a mut DocumentSyncEngine,
}

impl TranscriptSink for RoutedTranscript<'_> {
    fn on_transcript(&mut self, text: &str) {
        self.router.route(text, self.title, self.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(value: &str) -> DocumentSyncEngine {
        DocumentSyncEngine::new(value, |_| {})
    }

    #[test]
    fn test_default_is_body() {
        assert_eq!(ActiveFieldRouter::new().active(), ActiveField::Body);
    }

    #[test]
    fn test_blur_resets_to_body() {
        let mut router = ActiveFieldRouter::new();
        router.on_focus(ActiveField::Title);
        router.on_blur(ActiveField::Title);
        assert_eq!(router.active(), ActiveField::Body);
    }

    #[test]
    fn test_toggle_press_keeps_title() {
        let mut router = ActiveFieldRouter::new();
        router.on_focus(ActiveField::Title);
        router.on_toggle_press_start();
        router.on_blur(ActiveField::Title);
        assert_eq!(router.active(), ActiveField::Title);
        assert!(!router.is_blur_suppressed());

        // One-shot: the following blur resets again.
        router.on_focus(ActiveField::Title);
        router.on_blur(ActiveField::Title);
        assert_eq!(router.active(), ActiveField::Body);
    }

    #[test]
    fn test_suppression_consumed_by_any_field() {
        let mut router = ActiveFieldRouter::new();
        router.on_focus(ActiveField::Title);
        router.on_toggle_press_start();
        router.on_blur(ActiveField::Body);
        assert_eq!(router.active(), ActiveField::Title);
        assert!(!router.is_blur_suppressed());
    }

    #[test]
    fn test_route_to_title_and_body() {
        let mut router = ActiveFieldRouter::new();
        let mut title = String::from("Groceries");
        let mut body = engine("milk");

        router.handle(FocusSignal::Focus(ActiveField::Title));
        assert_eq!(router.route(" list", &mut title, &mut body), ActiveField::Title);
        assert_eq!(title, "Groceries list");
        assert_eq!(body.value(), "milk");

        router.handle(body.focus());
        assert_eq!(router.route(" eggs", &mut title, &mut body), ActiveField::Body);
        assert_eq!(body.value(), "milk eggs");
        assert_eq!(title, "Groceries list");
    }
}
