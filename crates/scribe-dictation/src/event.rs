//! Recognizer events, normalized at the platform boundary.
//!
//! Platform recognizers deliver loosely typed callbacks (a cumulative result
//! list with a start index, string error codes, start/end notifications).
//! Hosts translate those into [`RecognizerEvent`] before handing them to the
//! session, so the state machine only ever sees this closed set.

use smol_str::SmolStr;

/// A normalized recognizer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// The recognizer began capturing audio.
    Started,
    /// An interim hypothesis. Never emitted, never advances the result cursor.
    PartialResult { index: usize, text: SmolStr },
    /// A segment the recognizer will not revise further.
    FinalResult { index: usize, text: SmolStr },
    /// The recognizer reported an error.
    Error(RecognitionErrorKind),
    /// The recognizer stopped, for any reason.
    Ended,
}

/// Recognition error categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// No speech was detected before the recognizer timed out.
    NoSpeech,
    /// Recognition was aborted (often by the platform itself).
    Aborted,
    /// The audio device could not be captured.
    AudioCapture,
    /// The recognition service could not be reached.
    Network,
    /// The user or browser denied microphone access.
    NotAllowed,
    /// The recognition service is not allowed for this origin.
    ServiceNotAllowed,
    /// Anything else the platform reports.
    Other(SmolStr),
}

impl RecognitionErrorKind {
    /// Map a platform error code (e.g. `"no-speech"`) to a kind.
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            other => Self::Other(SmolStr::new(other)),
        }
    }

    /// Whether the error revokes permission for good.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::NotAllowed | Self::ServiceNotAllowed)
    }
}

/// One entry of a platform's cumulative result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    pub transcript: SmolStr,
    pub is_final: bool,
}

impl RawSegment {
    pub fn new(transcript: impl Into<SmolStr>, is_final: bool) -> Self {
        Self {
            transcript: transcript.into(),
            is_final,
        }
    }
}

/// Convert a cumulative result list into events.
///
/// `result_index` is the first entry the platform says changed; entries
/// before it are skipped. Each remaining entry becomes a `FinalResult` or
/// `PartialResult` carrying its absolute index.
pub fn normalize_results(result_index: usize, results: &[RawSegment]) -> Vec<RecognizerEvent> {
    results
        .iter()
        .enumerate()
        .skip(result_index)
        .map(|(index, seg)| {
            if seg.is_final {
                RecognizerEvent::FinalResult {
                    index,
                    text: seg.transcript.clone(),
                }
            } else {
                RecognizerEvent::PartialResult {
                    index,
                    text: seg.transcript.clone(),
                }
            }
        })
        .collect()
}
