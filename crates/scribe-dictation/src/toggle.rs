//! Press debouncing for the dictation toggle control.
//!
//! Touch devices fire both touch and mouse activation for one tap, and a
//! double activation would start and immediately stop the session.

use std::time::Duration;

use web_time::Instant;

use crate::config::DictationConfig;

/// Tracks the last accepted toggle press.
#[derive(Debug, Clone)]
pub struct DictationToggle {
    debounce: Duration,
    last_press: Option<Instant>,
}

impl DictationToggle {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last_press: None,
        }
    }

    /// A toggle using the configured debounce window.
    pub fn from_config(config: &DictationConfig) -> Self {
        Self::new(config.toggle_debounce)
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Register a press at `now`. Returns false if it should be ignored.
    pub fn press_at(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_press
            && now.saturating_duration_since(last) < self.debounce
        {
            tracing::trace!(target: "scribe::dictation", "toggle press debounced");
            return false;
        }
        self.last_press = Some(now);
        true
    }

    /// Register a press now.
    pub fn press(&mut self) -> bool {
        self.press_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_window() {
        let mut toggle = DictationToggle::from_config(&DictationConfig::default());
        assert_eq!(toggle.debounce(), Duration::from_millis(300));
        let t0 = Instant::now();
        assert!(toggle.press_at(t0));
        assert!(!toggle.press_at(t0 + Duration::from_millis(100)));
        assert!(toggle.press_at(t0 + Duration::from_millis(400)));
        // The window restarts from the last accepted press.
        assert!(!toggle.press_at(t0 + Duration::from_millis(650)));
    }

    #[test]
    fn test_configured_debounce_window() {
        let config = DictationConfig::from_json(r#"{"toggle_debounce_ms": 50}"#).unwrap();
        let mut toggle = DictationToggle::from_config(&config);
        let t0 = Instant::now();
        assert!(toggle.press_at(t0));
        assert!(!toggle.press_at(t0 + Duration::from_millis(40)));
        assert!(toggle.press_at(t0 + Duration::from_millis(60)));
    }
}
