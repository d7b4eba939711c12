//! The dictation session: a restartable wrapper around a streaming recognizer.
//!
//! Platform recognizers end on their own all the time (silence timeouts,
//! service-side limits, transient network blips). A session keeps dictation
//! going across those ends by restarting the same recognizer instance after a
//! short delay, until the user stops it or a fatal error occurs.
//!
//! The session is sans-io: it never sleeps or spawns. When the recognizer ends
//! and a restart is due, [`DictationSession::handle_event`] returns
//! [`SessionStep::RestartAfter`] and the host waits that long before calling
//! [`DictationSession::resume_after_delay`], usually via [`restart_task`].

use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;

use crate::config::DictationConfig;
use crate::error::DictationError;
use crate::event::{RecognitionErrorKind, RecognizerEvent};
use crate::recognizer::{SpeechRecognizer, TranscriptSink};
use crate::state::{DictationState, FatalReason};

/// What the host must do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    /// Nothing to schedule.
    Continue,
    /// Call `resume_after_delay` once this much time has passed.
    RestartAfter(Duration),
}

impl From<&FatalReason> for DictationError {
    fn from(reason: &FatalReason) -> Self {
        match reason {
            FatalReason::Unsupported => DictationError::Unsupported,
            FatalReason::NotAllowed => DictationError::NotAllowed,
            FatalReason::Network => DictationError::Network,
            FatalReason::AudioCapture => DictationError::AudioCapture,
            FatalReason::StartFailed(msg) => DictationError::StartFailed(msg.clone()),
        }
    }
}

/// A continuous dictation session.
///
/// `result_cursor` is the index of the first recognizer result not yet
/// emitted. It only moves forward within one recognizer run and resets to 0
/// whenever the recognizer is (re)started, which is exactly when the
/// platform's result list starts over.
pub struct DictationSession<R> {
    recognizer: Option<R>,
    state: DictationState,
    result_cursor: usize,
    continuation: bool,
    network_errors: u32,
    config: DictationConfig,
}

impl<R> std::fmt::Debug for DictationSession<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictationSession")
            .field("state", &self.state)
            .field("result_cursor", &self.result_cursor)
            .field("continuation", &self.continuation)
            .field("network_errors", &self.network_errors)
            .field("has_recognizer", &self.recognizer.is_some())
            .finish()
    }
}

impl<R: SpeechRecognizer> DictationSession<R> {
    /// Create a session. Pass `None` when the platform has no recognizer.
    pub fn new(recognizer: Option<R>, config: DictationConfig) -> Self {
        Self {
            recognizer,
            state: DictationState::Idle,
            result_cursor: 0,
            continuation: false,
            network_errors: 0,
            config,
        }
    }

    pub fn state(&self) -> &DictationState {
        &self.state
    }

    pub fn result_cursor(&self) -> usize {
        self.result_cursor
    }

    pub fn continuation(&self) -> bool {
        self.continuation
    }

    pub fn config(&self) -> &DictationConfig {
        &self.config
    }

    pub fn recognizer(&self) -> Option<&R> {
        self.recognizer.as_ref()
    }

    /// Whether the recognizer is running or about to run again.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Whether the dictation toggle should accept presses.
    pub fn is_control_enabled(&self) -> bool {
        if self.recognizer.is_none() {
            return false;
        }
        match &self.state {
            DictationState::Failed(reason) => !reason.disables_control(),
            _ => true,
        }
    }

    /// Start dictating.
    ///
    /// A no-op while the session is already active.
    pub fn start(&mut self) -> Result<(), DictationError> {
        if self.recognizer.is_none() {
            return Err(self.fail(FatalReason::Unsupported));
        }
        match &self.state {
            state if state.is_active() => {
                tracing::debug!(target: "scribe::dictation", %state, "start ignored, session active");
                return Ok(());
            }
            DictationState::Failed(reason) if reason.disables_control() => {
                return Err(reason.into());
            }
            _ => {}
        }

        self.continuation = true;
        self.network_errors = 0;
        self.begin_listening()
    }

    /// Stop dictating. Turns off automatic restarts.
    pub fn stop(&mut self) {
        self.continuation = false;
        match self.state {
            DictationState::Listening => {
                if let Some(recognizer) = self.recognizer.as_mut() {
                    recognizer.stop();
                }
                self.transition(DictationState::Stopping);
            }
            DictationState::Restarting => {
                self.transition(DictationState::Idle);
            }
            _ => {}
        }
    }

    /// Start when idle, stop when active.
    pub fn toggle(&mut self) -> Result<(), DictationError> {
        if self.is_active() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Feed one normalized recognizer event into the session.
    ///
    /// Finalized text goes to `sink`. Fatal errors put the session into
    /// `Failed` and are returned so the host can show them; transient errors
    /// are absorbed.
    pub fn handle_event<S: TranscriptSink + ?Sized>(
        &mut self,
        event: RecognizerEvent,
        sink: &mut S,
    ) -> Result<SessionStep, DictationError> {
        match event {
            RecognizerEvent::Started => {
                tracing::trace!(target: "scribe::dictation", "recognizer started");
            }
            RecognizerEvent::PartialResult { index, .. } => {
                tracing::trace!(target: "scribe::dictation", index, "interim result ignored");
            }
            RecognizerEvent::FinalResult { index, text } => {
                self.on_final_result(index, &text, sink);
            }
            RecognizerEvent::Error(kind) => {
                if let Some(reason) = self.classify_error(&kind) {
                    return Err(self.fail(reason));
                }
            }
            RecognizerEvent::Ended => return Ok(self.on_end()),
        }
        Ok(SessionStep::Continue)
    }

    /// Called by the host once the restart delay has elapsed.
    ///
    /// Re-checks the continuation flag, since `stop()` may have been called
    /// while waiting.
    pub fn resume_after_delay(&mut self) -> Result<(), DictationError> {
        if self.state != DictationState::Restarting {
            tracing::debug!(target: "scribe::dictation", state = %self.state, "restart no longer pending");
            return Ok(());
        }
        if !self.continuation {
            self.transition(DictationState::Idle);
            return Ok(());
        }
        tracing::debug!(target: "scribe::dictation", "restarting recognizer");
        self.begin_listening()
    }

    fn begin_listening(&mut self) -> Result<(), DictationError> {
        self.result_cursor = 0;
        let started = match self.recognizer.as_mut() {
            Some(recognizer) => recognizer.start(),
            None => return Err(self.fail(FatalReason::Unsupported)),
        };
        match started {
            Ok(()) => {
                self.transition(DictationState::Listening);
                Ok(())
            }
            Err(e) => Err(self.fail(FatalReason::StartFailed(e.0))),
        }
    }

    fn on_final_result<S: TranscriptSink + ?Sized>(&mut self, index: usize, text: &str, sink: &mut S) {
        if !matches!(
            self.state,
            DictationState::Listening | DictationState::Stopping
        ) {
            tracing::debug!(target: "scribe::dictation", index, state = %self.state, "stale result dropped");
            return;
        }
        if index < self.result_cursor {
            tracing::trace!(target: "scribe::dictation", index, cursor = self.result_cursor, "result already emitted");
            return;
        }
        self.result_cursor = index + 1;
        self.network_errors = 0;

        if text.trim().is_empty() {
            return;
        }
        let mut out = String::with_capacity(text.len() + self.config.delimiter.len());
        out.push_str(text);
        out.push_str(&self.config.delimiter);
        sink.on_transcript(&out);
    }

    /// Returns the fatal reason for `kind`, or `None` if it is transient.
    fn classify_error(&mut self, kind: &RecognitionErrorKind) -> Option<FatalReason> {
        if !self.is_active() {
            return None;
        }
        if kind.is_permission_denied() {
            return Some(FatalReason::NotAllowed);
        }
        // Restarting cannot bring a missing microphone back.
        if *kind == RecognitionErrorKind::AudioCapture {
            return Some(FatalReason::AudioCapture);
        }
        if *kind == RecognitionErrorKind::Network {
            self.network_errors += 1;
            if self.network_errors >= self.config.max_consecutive_network_errors {
                return Some(FatalReason::Network);
            }
        }
        tracing::debug!(
            target: "scribe::dictation",
            ?kind,
            network_errors = self.network_errors,
            "transient recognition error"
        );
        None
    }

    fn on_end(&mut self) -> SessionStep {
        match self.state {
            DictationState::Listening if self.continuation => {
                self.transition(DictationState::Restarting);
                SessionStep::RestartAfter(self.config.restart_delay)
            }
            DictationState::Listening | DictationState::Stopping => {
                self.transition(DictationState::Idle);
                SessionStep::Continue
            }
            _ => SessionStep::Continue,
        }
    }

    fn fail(&mut self, reason: FatalReason) -> DictationError {
        self.continuation = false;
        tracing::warn!(target: "scribe::dictation", from = %self.state, ?reason, "dictation failed");
        let err = DictationError::from(&reason);
        self.state = DictationState::Failed(reason);
        err
    }

    fn transition(&mut self, target: DictationState) {
        if self.state.can_transition_to(&target) {
            tracing::debug!(target: "scribe::dictation", "dictation state: {} -> {}", self.state, target);
            self.state = target;
        } else {
            tracing::warn!(target: "scribe::dictation", "invalid dictation transition: {} -> {}", self.state, target);
        }
    }
}

/// Wait out `delay`, then resume the session if it still exists.
///
/// The host spawns the returned future on its local executor whenever
/// `handle_event` yields [`SessionStep::RestartAfter`].
pub fn restart_task<R: SpeechRecognizer + 'static>(
    session: Weak<RefCell<DictationSession<R>>>,
    delay: Duration,
) -> LocalBoxFuture<'static, Result<(), DictationError>> {
    async move {
        n0_future::time::sleep(delay).await;
        let Some(session) = session.upgrade() else {
            tracing::debug!(target: "scribe::dictation", "session dropped before restart");
            return Ok(());
        };
        let mut session = session.borrow_mut();
        session.resume_after_delay()
    }
    .boxed_local()
}
