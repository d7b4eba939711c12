//! Platform boundary traits: the recognizer the session drives and the sink
//! it writes to.

use crate::error::RecognizerError;

/// A platform streaming speech recognizer.
///
/// The same instance is restarted many times over a session's lifetime.
/// Implementations deliver their callbacks to the host, which normalizes them
/// into [`RecognizerEvent`](crate::RecognizerEvent)s and feeds them back to
/// the session.
pub trait SpeechRecognizer {
    /// Begin streaming recognition.
    fn start(&mut self) -> Result<(), RecognizerError>;

    /// Ask the recognizer to stop. It still reports `Ended` afterwards.
    fn stop(&mut self);
}

/// Receives finalized dictation text.
pub trait TranscriptSink {
    fn on_transcript(&mut self, text: &str);
}

impl TranscriptSink for String {
    fn on_transcript(&mut self, text: &str) {
        self.push_str(text);
    }
}

impl TranscriptSink for Vec<String> {
    fn on_transcript(&mut self, text: &str) {
        self.push(text.to_string());
    }
}
