//! Tunables for dictation sessions.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default wait between an unexpected recognizer end and the automatic restart.
pub const DEFAULT_RESTART_DELAY_MS: u64 = 250;

/// Default debounce window for the dictation toggle control.
pub const DEFAULT_TOGGLE_DEBOUNCE_MS: u64 = 300;

/// Dictation session configuration.
///
/// Deserializes from JSON with every field optional; durations are given in
/// milliseconds (`restart_delay_ms`, `toggle_debounce_ms`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Wait before restarting after the recognizer ends on its own.
    #[serde(rename = "restart_delay_ms", with = "millis")]
    pub restart_delay: Duration,
    /// Appended after every finalized segment.
    pub delimiter: String,
    /// Consecutive network errors tolerated before the session gives up.
    pub max_consecutive_network_errors: u32,
    /// Presses of the toggle closer together than this are ignored.
    #[serde(rename = "toggle_debounce_ms", with = "millis")]
    pub toggle_debounce: Duration,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_millis(DEFAULT_RESTART_DELAY_MS),
            delimiter: " ".to_string(),
            max_consecutive_network_errors: 3,
            toggle_debounce: Duration::from_millis(DEFAULT_TOGGLE_DEBOUNCE_MS),
        }
    }
}

impl DictationConfig {
    /// Parse a config from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override the restart delay.
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
