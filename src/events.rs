//! Host-delivered input events.
//!
//! The engine never talks to a real event source; the host translates its
//! native keyboard/layout notifications into these snapshots and feeds them
//! to [`SpeedController`](crate::core::controller::SpeedController).

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const fn none() -> Self {
        Self {
            ctrl: false,
            alt: false,
            meta: false,
            shift: false,
        }
    }

    /// Ctrl only.
    pub const fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::none()
        }
    }

    /// Alt/Option only.
    pub const fn alt() -> Self {
        Self {
            alt: true,
            ..Self::none()
        }
    }

    /// OS/Command key only.
    pub const fn meta() -> Self {
        Self {
            meta: true,
            ..Self::none()
        }
    }
}

/// Snapshot of one physical key release.
///
/// `key` is the printable symbol the layout produced (None for non-printable
/// keys); `code` is the legacy hardware key code kept for layouts that remap
/// the physical speed key to a different symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyupEvent {
    /// Printable symbol, layout-dependent.
    pub key: Option<char>,
    /// Legacy hardware key code (0 when the host does not report one).
    pub code: u32,
    /// Modifier set at release time.
    pub modifiers: Modifiers,
    /// Host event timestamp in milliseconds.
    pub timestamp_ms: f64,
    /// True when the event target sits inside a media element's subtree.
    pub target_in_media: bool,
}

impl KeyupEvent {
    /// Plain key release with no modifiers, outside any media subtree.
    pub fn new(key: char, timestamp_ms: f64) -> Self {
        Self {
            key: Some(key),
            code: 0,
            modifiers: Modifiers::none(),
            timestamp_ms,
            target_in_media: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = code;
        self
    }

    pub fn inside_media(mut self) -> Self {
        self.target_in_media = true;
        self
    }
}

/// Notification that the set of visible/laid-out media elements may have
/// changed. All variants are handled identically: they request one coalesced
/// badge reposition on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSignal {
    /// A media element entered or left the viewport.
    IntersectionChanged,
    /// Attribute or subtree mutation somewhere in the document.
    DomMutated,
    /// Fullscreen was entered or exited.
    FullscreenToggled,
}
