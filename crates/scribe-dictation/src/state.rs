//! Dictation session states and the transitions allowed between them.
//!
//! - Idle -> Listening (start)
//! - Listening -> Restarting (recognizer ended while continuation is on)
//! - Restarting -> Listening (delay elapsed, continuation still on)
//! - Restarting -> Idle (stopped during the delay)
//! - Listening -> Stopping -> Idle (stop requested, then recognizer ended)
//! - Listening -> Idle (recognizer ended with continuation off)
//! - Idle/Listening/Restarting -> Failed (fatal error)
//! - Failed -> Listening (retry, unless the failure disabled the control)

use std::fmt;

/// Why a session failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalReason {
    /// No streaming recognizer on this platform.
    Unsupported,
    /// Permission denied.
    NotAllowed,
    /// Repeated network failures.
    Network,
    /// No usable microphone.
    AudioCapture,
    /// The recognizer refused to start.
    StartFailed(String),
}

impl FatalReason {
    /// Whether the dictation control stays disabled for good.
    pub fn disables_control(&self) -> bool {
        matches!(self, FatalReason::Unsupported | FatalReason::NotAllowed)
    }
}

/// Operational state of a dictation session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DictationState {
    /// Not dictating. Ready to start.
    #[default]
    Idle,
    /// Streaming recognition is running.
    Listening,
    /// The recognizer ended on its own; waiting out the restart delay.
    Restarting,
    /// Stop was requested; waiting for the recognizer to report its end.
    Stopping,
    /// A fatal error ended the session.
    Failed(FatalReason),
}

impl fmt::Display for DictationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictationState::Idle => write!(f, "Idle"),
            DictationState::Listening => write!(f, "Listening"),
            DictationState::Restarting => write!(f, "Restarting"),
            DictationState::Stopping => write!(f, "Stopping"),
            DictationState::Failed(reason) => write!(f, "Failed({reason:?})"),
        }
    }
}

impl DictationState {
    /// Whether the recognizer is running or about to run again.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            DictationState::Listening | DictationState::Restarting | DictationState::Stopping
        )
    }

    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &DictationState) -> bool {
        use DictationState::*;
        match (self, target) {
            (Idle, Listening)
            | (Listening, Restarting)
            | (Restarting, Listening)
            | (Restarting, Idle)
            | (Listening, Stopping)
            | (Stopping, Idle)
            | (Listening, Idle) => true,
            (Idle | Listening | Restarting, Failed(_)) => true,
            (Failed(reason), Listening) => !reason.disables_control(),
            _ => false,
        }
    }
}
