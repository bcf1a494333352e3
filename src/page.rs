//! Page surface capability - the engine's only view of the host page.
//!
//! **Architecture**: the engine never touches a real DOM. Everything it needs
//! from the page (media elements, the active element, the badge node, the
//! optional player quality API) goes through [`PageSurface`], injected by the
//! host. Browser hosts back it with real elements; tests and headless
//! embedders use [`HeadlessPage`](crate::headless::HeadlessPage).
//!
//! Media elements are addressed by [`MediaId`] rather than borrowed handles
//! so the trait stays object-safe and the surface owns element lifetime.

use anyhow::Result;
use uuid::Uuid;

/// Stable identity of one media element on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(Uuid);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Screen-space bounding box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// False for detached / not-yet-laid-out elements (zero area).
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Axis-aligned overlap test (strict on all four sides).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Kind of element currently holding focus.
///
/// Shortcut handling is suppressed while the user is typing somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveElement {
    #[default]
    Other,
    TextInput,
    TextArea,
    ContentEditable,
}

impl ActiveElement {
    /// True when keystrokes belong to a text-entry widget.
    pub fn is_text_entry(&self) -> bool {
        matches!(
            self,
            ActiveElement::TextInput | ActiveElement::TextArea | ActiveElement::ContentEditable
        )
    }
}

/// Host page capability surface.
///
/// Media queries return `None` for unknown ids (the element may have been
/// removed between frames); writes to unknown ids are silent no-ops. Badge
/// mutators before `ensure_badge()` are likewise no-ops - the badge is a
/// lazily-created page-lifetime singleton owned by the indicator.
pub trait PageSurface {
    /// Ids of all media elements, in document order.
    fn media_ids(&self) -> Vec<MediaId>;

    fn playback_rate(&self, id: MediaId) -> Option<f64>;
    fn set_playback_rate(&mut self, id: MediaId, rate: f64);

    /// Media duration in seconds (may be NaN/infinite for live streams).
    fn duration(&self, id: MediaId) -> Option<f64>;
    fn set_current_time(&mut self, id: MediaId, seconds: f64);

    /// Current screen-space bounding box, zero-sized when not laid out.
    fn media_bounds(&self, id: MediaId) -> Option<Rect>;

    /// Visible window rectangle.
    fn viewport(&self) -> Rect;

    /// What currently holds keyboard focus.
    fn active_element(&self) -> ActiveElement;

    /// Create the badge element if it does not exist yet (idempotent).
    fn ensure_badge(&mut self);
    fn badge_exists(&self) -> bool;
    fn set_badge_text(&mut self, text: &str);
    fn set_badge_visible(&mut self, visible: bool);
    fn set_badge_opacity(&mut self, opacity: f64);
    /// Move the badge so its center lands on the given point.
    fn set_badge_center(&mut self, x: f64, y: f64);

    /// Best-effort player quality API; `None` when the host player does not
    /// expose one (common - the engine must tolerate total absence).
    fn quality_control(&mut self) -> Option<&mut dyn QualityControl>;
}

/// Optional collaborator exposing the host player's quality levels.
///
/// Every method is fallible: the underlying player object can disappear or
/// misbehave at any time. Failures are logged and never abort a rate change.
pub trait QualityControl {
    /// Quality level names, best first (host-defined strings like "hd1080").
    fn available_levels(&self) -> Result<Vec<String>>;

    fn current_quality(&self) -> Result<String>;

    fn set_quality(&mut self, level: &str) -> Result<()>;
}
