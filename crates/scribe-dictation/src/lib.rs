//! scribe-dictation: continuous dictation over a platform speech recognizer.
//!
//! This crate provides:
//! - `DictationSession` - restartable state machine around a `SpeechRecognizer`
//! - `RecognizerEvent` - the closed set of events hosts normalize platform callbacks into
//! - `TranscriptSink` - where finalized text goes
//! - `DictationToggle` - press debouncing for the on/off control

mod config;
mod error;
mod event;
mod recognizer;
mod session;
mod state;
mod toggle;

pub use config::{DEFAULT_RESTART_DELAY_MS, DEFAULT_TOGGLE_DEBOUNCE_MS, DictationConfig};
pub use error::{ConfigError, DictationError, RecognizerError};
pub use event::{RawSegment, RecognitionErrorKind, RecognizerEvent, normalize_results};
pub use recognizer::{SpeechRecognizer, TranscriptSink};
pub use session::{DictationSession, SessionStep, restart_task};
pub use state::{DictationState, FatalReason};
pub use toggle::DictationToggle;
