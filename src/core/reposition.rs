//! Reposition scheduler - keeps the badge aligned with its media element.
//!
//! Layout can change for many reasons at once (intersection changes, DOM
//! mutations, fullscreen toggles). All of them funnel into `request()`,
//! which coalesces to at most one recomputation per rendering frame: a
//! request while one is already pending is a no-op. The controller drains
//! the flag with `begin_frame()` from the host's animation-frame callback.

use log::trace;

use crate::page::{MediaId, PageSurface};

/// Single-flight per-frame scheduler.
#[derive(Debug, Clone, Default)]
pub struct RepositionScheduler {
    frame_pending: bool,
}

impl RepositionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a reposition on the next frame. Returns true when this call
    /// actually scheduled one (false: already pending, coalesced).
    pub fn request(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        trace!("reposition scheduled");
        true
    }

    pub fn is_pending(&self) -> bool {
        self.frame_pending
    }

    /// Take the pending flag at the start of a frame. Returns true when a
    /// recomputation should run now.
    pub fn begin_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }
}

/// First media element (document order) whose box overlaps the viewport.
pub fn first_in_viewport(page: &dyn PageSurface) -> Option<MediaId> {
    let viewport = page.viewport();
    page.media_ids().into_iter().find(|id| {
        page.media_bounds(*id)
            .is_some_and(|b| b.is_laid_out() && b.intersects(&viewport))
    })
}

/// Element the badge should represent: first in the viewport, falling back
/// to the first in document order when nothing is visible.
pub fn representative_media(page: &dyn PageSurface) -> Option<MediaId> {
    first_in_viewport(page).or_else(|| page.media_ids().into_iter().next())
}
