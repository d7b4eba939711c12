//! Error types for dictation sessions.

use thiserror::Error;

/// Failures a dictation session reports to its host.
///
/// Every variant is fatal for the current session; transient recognizer
/// errors are absorbed by the session and never surface here. The `Display`
/// text is meant to be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DictationError {
    /// The platform offers no streaming recognizer.
    #[error("speech recognition is not supported on this device")]
    Unsupported,

    /// Microphone or recognition service permission was denied.
    #[error("microphone access was denied; dictation has been disabled")]
    NotAllowed,

    /// The recognizer kept failing with network errors.
    #[error("dictation stopped: speech service is unreachable")]
    Network,

    /// No working microphone was found.
    #[error("dictation stopped: no microphone is available")]
    AudioCapture,

    /// The recognizer refused to start.
    #[error("dictation could not start: {0}")]
    StartFailed(String),
}

/// Error raised by a platform recognizer when asked to start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("recognizer error: {0}")]
pub struct RecognizerError(pub String);

impl From<&str> for RecognizerError {
    fn from(s: &str) -> Self {
        RecognizerError(s.to_string())
    }
}

impl From<String> for RecognizerError {
    fn from(s: String) -> Self {
        RecognizerError(s)
    }
}

/// Configuration could not be loaded.
#[derive(Error, Debug)]
#[error("invalid dictation config: {0}")]
pub struct ConfigError(#[from] pub serde_json::Error);
