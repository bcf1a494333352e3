//! Core engine modules - gate, classifier, rate policy, indicator, scheduler.
//!
//! These modules form the speed engine, independent of any host page.

pub mod controller;
pub mod debounce;
pub mod indicator;
pub mod notify;
pub mod reposition;
pub mod shortcut;
pub mod speed;

// Re-exports for convenience
pub use controller::SpeedController;
pub use debounce::DebounceGate;
pub use indicator::{EffectKind, Indicator, IndicatorPhase};
pub use notify::{ControllerEvent, ControllerEventSender};
pub use reposition::RepositionScheduler;
pub use shortcut::{ShortcutAction, classify};
pub use speed::{CycleMode, SpeedLadder, next_rate};
