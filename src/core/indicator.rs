//! Indicator lifecycle - owns the on-screen speed badge.
//!
//! The badge is a single lazily-created element; this module is its only
//! writer. Lifecycle: `Hidden -> Showing -> FadingOut -> Hidden`. Starting
//! an effect is single-flight: any in-flight animation is cancelled first,
//! so rapid shortcut presses restart the effect from a clean state instead
//! of stacking two tweens on the same element.
//!
//! Two effect strategies implement the same contract (visible immediately,
//! hidden after a bounded duration): a linear opacity fade, and a
//! pop-in/hold/pop-out pulse. The host picks one via configuration.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::page::{PageSurface, Rect};

/// Pulse keyframes (fractions of the effect duration).
const PULSE_POP_IN_END: f64 = 0.15;
const PULSE_POP_OUT_START: f64 = 0.7;

/// Visual effect used to retire the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Linear opacity decay, then hide.
    #[default]
    Fade,
    /// Pop in, hold, pop out, then hide.
    Pulse,
}

/// Where the badge is in its show/retire cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorPhase {
    #[default]
    Hidden,
    Showing,
    FadingOut,
}

/// One in-flight effect. At most one exists at a time.
#[derive(Debug, Clone, Copy)]
struct Animation {
    handle: u64,
    kind: EffectKind,
    started_ms: f64,
    duration_ms: f64,
}

/// Badge owner and animation driver.
#[derive(Debug)]
pub struct Indicator {
    effect: EffectKind,
    show_opacity: f64,
    fade_start_opacity: f64,
    fade_duration_ms: f64,
    pulse_duration_ms: f64,
    phase: IndicatorPhase,
    active: Option<Animation>,
    next_handle: u64,
}

impl Indicator {
    pub fn new(config: &Config) -> Self {
        // Zero or NaN durations would poison the progress math
        let config = config.sanitized();
        Self {
            effect: config.effect,
            show_opacity: config.show_opacity,
            fade_start_opacity: config.fade_start_opacity,
            fade_duration_ms: config.fade_duration_ms,
            pulse_duration_ms: config.pulse_duration_ms,
            phase: IndicatorPhase::Hidden,
            active: None,
            next_handle: 0,
        }
    }

    pub fn phase(&self) -> IndicatorPhase {
        self.phase
    }

    /// Handle of the in-flight animation, if any. Handles are monotonic and
    /// never reused, so tests can observe cancel-and-restart.
    pub fn active_handle(&self) -> Option<u64> {
        self.active.map(|a| a.handle)
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Show the badge with the given rate and (re)start the retire effect.
    pub fn show(&mut self, page: &mut dyn PageSurface, rate: f64, now_ms: f64) {
        page.ensure_badge();
        page.set_badge_text(&format_rate(rate));
        page.set_badge_visible(true);
        page.set_badge_opacity(self.show_opacity);

        self.cancel_active();
        let handle = self.next_handle;
        self.next_handle += 1;
        let duration_ms = match self.effect {
            EffectKind::Fade => self.fade_duration_ms,
            EffectKind::Pulse => self.pulse_duration_ms,
        };
        self.active = Some(Animation {
            handle,
            kind: self.effect,
            started_ms: now_ms,
            duration_ms,
        });
        self.phase = IndicatorPhase::Showing;
        trace!("indicator showing {}x (animation #{handle})", rate);
    }

    /// Center the badge over the target's bounding box. Zero-sized targets
    /// (not laid out / detached) are skipped, keeping the prior position.
    pub fn reposition(&self, page: &mut dyn PageSurface, target: Rect) {
        if !target.is_laid_out() {
            trace!("reposition target not laid out, keeping prior position");
            return;
        }
        let (x, y) = target.center();
        page.set_badge_center(x, y);
    }

    /// Hide the badge immediately, cancelling any in-flight effect.
    /// Returns true when this actually changed visible state.
    pub fn hide(&mut self, page: &mut dyn PageSurface) -> bool {
        if self.phase == IndicatorPhase::Hidden && self.active.is_none() {
            return false;
        }
        self.cancel_active();
        page.set_badge_visible(false);
        self.phase = IndicatorPhase::Hidden;
        true
    }

    /// Advance the active effect to `now_ms`. Returns true while another
    /// frame is needed.
    pub fn tick(&mut self, page: &mut dyn PageSurface, now_ms: f64) -> bool {
        let Some(anim) = self.active else {
            return false;
        };

        let progress = ((now_ms - anim.started_ms) / anim.duration_ms).clamp(0.0, 1.0);
        if progress >= 1.0 {
            trace!("indicator animation #{} finished", anim.handle);
            page.set_badge_visible(false);
            self.active = None;
            self.phase = IndicatorPhase::Hidden;
            return false;
        }

        let opacity = match anim.kind {
            EffectKind::Fade => self.fade_start_opacity * (1.0 - progress),
            EffectKind::Pulse => pulse_opacity(progress, self.show_opacity),
        };
        page.set_badge_opacity(opacity);

        self.phase = match anim.kind {
            EffectKind::Fade => IndicatorPhase::FadingOut,
            EffectKind::Pulse if progress >= PULSE_POP_OUT_START => IndicatorPhase::FadingOut,
            EffectKind::Pulse => IndicatorPhase::Showing,
        };
        true
    }

    fn cancel_active(&mut self) {
        if let Some(anim) = self.active.take() {
            trace!("cancelled in-flight animation #{}", anim.handle);
        }
    }
}

/// Badge text for a rate: `2 -> "2x"`, `1.25 -> "1.25x"`.
pub fn format_rate(rate: f64) -> String {
    format!("{rate}x")
}

/// Pop-in / hold / pop-out opacity curve.
fn pulse_opacity(progress: f64, base_opacity: f64) -> f64 {
    if progress < PULSE_POP_IN_END {
        let t = progress / PULSE_POP_IN_END;
        base_opacity + (1.0 - base_opacity) * t
    } else if progress < PULSE_POP_OUT_START {
        1.0
    } else {
        let t = (progress - PULSE_POP_OUT_START) / (1.0 - PULSE_POP_OUT_START);
        1.0 - t
    }
}
