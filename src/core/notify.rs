//! Controller notifications.
//!
//! Emitted when the engine changes observable state (rates, seeks, the
//! indicator) so hosts can hook diagnostics or UI without the engine knowing
//! about them.

use crossbeam_channel::Sender;

use crate::page::MediaId;

/// Observable engine state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Playback rate applied to the page's media elements.
    RateChanged { rate: f64, targets: usize },

    /// Current time set on one media element.
    SeekApplied { media: MediaId, seconds: f64 },

    /// Badge made visible with the given rate text.
    IndicatorShown { rate: f64 },

    /// Badge hidden (effect finished, or no media left in the viewport).
    IndicatorHidden,

    /// Host player quality raised to the named level.
    QualityUpgraded { level: String },
}

/// Event sender wrapper for the controller.
///
/// Hosts that care pass a channel; everyone else gets the dummy.
#[derive(Clone, Debug)]
pub struct ControllerEventSender {
    sender: Option<Sender<ControllerEvent>>,
}

impl ControllerEventSender {
    /// Sender wired to a subscriber channel.
    pub fn new(sender: Sender<ControllerEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Sender that discards everything, for hosts that never subscribe.
    pub fn dummy() -> Self {
        Self { sender: None }
    }

    /// Deliver an event to the subscriber, if there is one.
    pub fn emit(&self, event: ControllerEvent) {
        if let Some(ref tx) = self.sender {
            // A hung-up subscriber just loses the event
            let _ = tx.send(event);
        }
    }
}

impl Default for ControllerEventSender {
    fn default() -> Self {
        Self::dummy()
    }
}
