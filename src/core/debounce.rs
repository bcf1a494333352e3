//! Debounce gate - suppresses rapid repeats of the speed shortcut.
//!
//! A single physical key release can be observed twice when the host ends up
//! with duplicated listeners, and key-repeat would otherwise cycle the rate
//! uncontrollably. The gate rejects any event arriving within the window
//! after the last *accepted* event; rejected events never advance the clock.

use log::trace;

/// Default minimum spacing between accepted shortcut events.
pub const DEFAULT_DEBOUNCE_MS: f64 = 100.0;

/// Event-timestamp debounce over the host's millisecond clock.
///
/// Timestamps come from the events themselves, not wall time, so the gate is
/// deterministic under test and immune to handler scheduling jitter.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    window_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl DebounceGate {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    /// Timestamp of the last accepted event, non-decreasing over time.
    pub fn last_accepted_ms(&self) -> Option<f64> {
        self.last_accepted_ms
    }

    /// Admit or reject an event by its timestamp. Updates the clock only on
    /// acceptance, so a burst of repeats cannot push the window forward.
    pub fn admit(&mut self, timestamp_ms: f64) -> bool {
        if let Some(last) = self.last_accepted_ms
            && timestamp_ms - last < self.window_ms
        {
            trace!(
                "debounced shortcut ({:.1}ms since last accepted)",
                timestamp_ms - last
            );
            return false;
        }
        self.last_accepted_ms = Some(timestamp_ms);
        true
    }

    /// Forget the last accepted event (e.g. when the page is re-shown).
    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
