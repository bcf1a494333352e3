//! In-memory page surface.
//!
//! Backs every crate test and lets embedders run the engine without a real
//! page (simulation, golden recordings, host-side integration tests). State
//! is plain structs with public read access so assertions stay direct.

use anyhow::{Result, bail};

use crate::page::{ActiveElement, MediaId, PageSurface, QualityControl, Rect};

/// One simulated media element.
#[derive(Debug, Clone)]
pub struct MediaState {
    pub id: MediaId,
    pub playback_rate: f64,
    pub current_time: f64,
    pub duration: f64,
    pub bounds: Rect,
}

/// Simulated badge element.
#[derive(Debug, Clone, Default)]
pub struct BadgeState {
    pub text: String,
    pub visible: bool,
    pub opacity: f64,
    pub center: Option<(f64, f64)>,
}

/// Scriptable quality collaborator.
///
/// `fail_listing` simulates the host player object disappearing mid-call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedQuality {
    pub levels: Vec<String>,
    pub current: String,
    pub fail_listing: bool,
}

impl ScriptedQuality {
    pub fn new(levels: &[&str], current: &str) -> Self {
        Self {
            levels: levels.iter().map(|s| s.to_string()).collect(),
            current: current.to_string(),
            fail_listing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }
}

impl QualityControl for ScriptedQuality {
    fn available_levels(&self) -> Result<Vec<String>> {
        if self.fail_listing {
            bail!("player object is gone");
        }
        Ok(self.levels.clone())
    }

    fn current_quality(&self) -> Result<String> {
        Ok(self.current.clone())
    }

    fn set_quality(&mut self, level: &str) -> Result<()> {
        self.current = level.to_string();
        Ok(())
    }
}

/// In-memory [`PageSurface`] implementation.
#[derive(Debug, Default)]
pub struct HeadlessPage {
    media: Vec<MediaState>,
    badge: Option<BadgeState>,
    viewport: Rect,
    active_element: ActiveElement,
    quality: Option<ScriptedQuality>,
}

impl HeadlessPage {
    /// Empty page with a 1280x720 viewport.
    pub fn new() -> Self {
        Self {
            viewport: Rect::new(0.0, 0.0, 1280.0, 720.0),
            ..Self::default()
        }
    }

    /// Add a media element at normal speed, time zero. Returns its id.
    pub fn add_media(&mut self, duration: f64, bounds: Rect) -> MediaId {
        let id = MediaId::new();
        self.media.push(MediaState {
            id,
            playback_rate: 1.0,
            current_time: 0.0,
            duration,
            bounds,
        });
        id
    }

    pub fn media(&self, id: MediaId) -> Option<&MediaState> {
        self.media.iter().find(|m| m.id == id)
    }

    pub fn set_media_bounds(&mut self, id: MediaId, bounds: Rect) {
        if let Some(m) = self.media.iter_mut().find(|m| m.id == id) {
            m.bounds = bounds;
        }
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn set_active_element(&mut self, active: ActiveElement) {
        self.active_element = active;
    }

    pub fn set_quality_control(&mut self, quality: ScriptedQuality) {
        self.quality = Some(quality);
    }

    pub fn quality(&self) -> Option<&ScriptedQuality> {
        self.quality.as_ref()
    }

    pub fn badge(&self) -> Option<&BadgeState> {
        self.badge.as_ref()
    }
}

impl PageSurface for HeadlessPage {
    fn media_ids(&self) -> Vec<MediaId> {
        self.media.iter().map(|m| m.id).collect()
    }

    fn playback_rate(&self, id: MediaId) -> Option<f64> {
        self.media(id).map(|m| m.playback_rate)
    }

    fn set_playback_rate(&mut self, id: MediaId, rate: f64) {
        if let Some(m) = self.media.iter_mut().find(|m| m.id == id) {
            m.playback_rate = rate;
        }
    }

    fn duration(&self, id: MediaId) -> Option<f64> {
        self.media(id).map(|m| m.duration)
    }

    fn set_current_time(&mut self, id: MediaId, seconds: f64) {
        if let Some(m) = self.media.iter_mut().find(|m| m.id == id) {
            m.current_time = seconds;
        }
    }

    fn media_bounds(&self, id: MediaId) -> Option<Rect> {
        self.media(id).map(|m| m.bounds)
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn active_element(&self) -> ActiveElement {
        self.active_element
    }

    fn ensure_badge(&mut self) {
        if self.badge.is_none() {
            self.badge = Some(BadgeState::default());
        }
    }

    fn badge_exists(&self) -> bool {
        self.badge.is_some()
    }

    fn set_badge_text(&mut self, text: &str) {
        if let Some(badge) = &mut self.badge {
            badge.text = text.to_string();
        }
    }

    fn set_badge_visible(&mut self, visible: bool) {
        if let Some(badge) = &mut self.badge {
            badge.visible = visible;
        }
    }

    fn set_badge_opacity(&mut self, opacity: f64) {
        if let Some(badge) = &mut self.badge {
            badge.opacity = opacity;
        }
    }

    fn set_badge_center(&mut self, x: f64, y: f64) {
        if let Some(badge) = &mut self.badge {
            badge.center = Some((x, y));
        }
    }

    fn quality_control(&mut self) -> Option<&mut dyn QualityControl> {
        self.quality
            .as_mut()
            .map(|q| q as &mut dyn QualityControl)
    }
}
