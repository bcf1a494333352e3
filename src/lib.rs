//! SPEEDUP - keyboard playback-speed engine with an on-screen indicator
//!
//! Captures keyboard chords, computes a target playback rate, applies it to
//! the page's media elements and shows a transient speed badge centered on
//! the active video. The host page is abstracted behind the
//! [`PageSurface`] capability, so the whole engine runs single-threaded,
//! deterministic and host-agnostic.
//!
//! ```
//! use speedup::{Config, HeadlessPage, KeyupEvent, Rect, SpeedController};
//!
//! let mut page = HeadlessPage::new();
//! let video = page.add_media(100.0, Rect::new(0.0, 0.0, 640.0, 360.0));
//! let mut controller = SpeedController::new(Config::default());
//!
//! controller.on_keyup(&mut page, &KeyupEvent::new('`', 0.0));
//! assert_eq!(page.media(video).unwrap().playback_rate, 1.25);
//! assert_eq!(page.badge().unwrap().text, "1.25x");
//!
//! // Host render loop drives the badge fade until it self-hides
//! while controller.wants_frame() {
//!     controller.on_frame(&mut page, 1000.0);
//! }
//! assert!(!page.badge().unwrap().visible);
//! ```

// Core engine (gate, classifier, rate policy, indicator, scheduler)
pub mod core;

// Host-facing modules
pub mod config;
pub mod events;
pub mod headless;
pub mod page;

// Re-export commonly used types from core
pub use crate::core::controller::SpeedController;
pub use crate::core::debounce::DebounceGate;
pub use crate::core::indicator::{EffectKind, Indicator, IndicatorPhase};
pub use crate::core::notify::{ControllerEvent, ControllerEventSender};
pub use crate::core::reposition::RepositionScheduler;
pub use crate::core::shortcut::{ShortcutAction, classify};
pub use crate::core::speed::{CycleMode, DEFAULT_LADDER, SpeedLadder, next_rate};

// Re-export host-facing types
pub use crate::config::Config;
pub use crate::events::{KeyupEvent, LayoutSignal, Modifiers};
pub use crate::headless::HeadlessPage;
pub use crate::page::{ActiveElement, MediaId, PageSurface, QualityControl, Rect};
