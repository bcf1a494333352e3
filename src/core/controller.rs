//! Central dispatch - wires the gate, classifier, rate policy, indicator
//! and reposition scheduler together.
//!
//! **Architecture**: the controller does NOT own the page. Every entry point
//! receives `&mut dyn PageSurface`, so the host decides what a "page" is and
//! the controller stays a deterministic state machine.
//!
//! Host contract:
//! - forward key releases to [`SpeedController::on_keyup`]
//! - forward layout notifications to [`SpeedController::on_layout_signal`]
//! - while [`SpeedController::wants_frame`] is true, call
//!   [`SpeedController::on_frame`] from the render/animation loop
//!
//! Everything here is single-threaded and non-fatal: a missing media
//! element, badge or quality API degrades to a no-op or a log line, never
//! to a wrong playback rate.

use anyhow::Result;
use log::{debug, info, trace, warn};

use crate::config::Config;
use crate::core::debounce::DebounceGate;
use crate::core::indicator::Indicator;
use crate::core::notify::{ControllerEvent, ControllerEventSender};
use crate::core::reposition::{RepositionScheduler, first_in_viewport, representative_media};
use crate::core::shortcut::{ShortcutAction, classify};
use crate::core::speed::{SpeedLadder, next_rate};
use crate::events::{KeyupEvent, LayoutSignal};
use crate::page::{MediaId, PageSurface, QualityControl};

/// Playback-speed engine. One instance per page.
#[derive(Debug)]
pub struct SpeedController {
    config: Config,
    ladder: SpeedLadder,
    gate: DebounceGate,
    indicator: Indicator,
    scheduler: RepositionScheduler,
    events: ControllerEventSender,
}

impl SpeedController {
    pub fn new(config: Config) -> Self {
        Self::with_events(config, ControllerEventSender::dummy())
    }

    /// Controller with a connected notification channel.
    ///
    /// Host-provided settings are sanitized here: unusable ladders,
    /// durations and opacities degrade to defaults instead of misbehaving.
    pub fn with_events(config: Config, events: ControllerEventSender) -> Self {
        let config = config.sanitized();
        let ladder = config.ladder_or_default();
        let gate = DebounceGate::new(config.debounce_ms);
        let indicator = Indicator::new(&config);
        Self {
            config,
            ladder,
            gate,
            indicator,
            scheduler: RepositionScheduler::new(),
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    /// Handle one key release.
    ///
    /// Pipeline: focus guard -> classifier -> debounce -> action. The
    /// classifier runs before the debounce gate so unrelated typing never
    /// advances the gate's clock.
    pub fn on_keyup(&mut self, page: &mut dyn PageSurface, event: &KeyupEvent) {
        if page.active_element().is_text_entry() {
            return;
        }
        let Some(action) = classify(event, self.config.seek_enabled) else {
            return;
        };
        if !self.gate.admit(event.timestamp_ms) {
            return;
        }

        match action {
            ShortcutAction::ToggleOrCycle => {
                let Some(rep) = representative_media(page) else {
                    trace!("no media element on page");
                    return;
                };
                let current = page.playback_rate(rep).unwrap_or(1.0);
                let rate = next_rate(self.config.cycle_mode, &self.ladder, current);
                let targets = apply_rate(page, rate);
                info!("playback rate {rate}x applied to {targets} element(s)");
                if self.config.upgrade_quality {
                    self.upgrade_quality(page);
                }
                self.show_indicator(page, rep, rate, event.timestamp_ms);
                self.events.emit(ControllerEvent::RateChanged { rate, targets });
            }
            ShortcutAction::FixedRate(rate) => {
                let Some(rep) = representative_media(page) else {
                    trace!("no media element on page");
                    return;
                };
                let targets = apply_rate(page, rate);
                info!("playback rate {rate}x applied to {targets} element(s)");
                self.show_indicator(page, rep, rate, event.timestamp_ms);
                self.events.emit(ControllerEvent::RateChanged { rate, targets });
            }
            ShortcutAction::Seek(digit) => self.seek(page, event, digit),
        }
    }

    /// Record that media layout may have changed. Coalesced: any number of
    /// signals before the next frame produce exactly one recomputation.
    pub fn on_layout_signal(&mut self, signal: LayoutSignal) {
        if self.scheduler.request() {
            trace!("layout change ({signal:?}) scheduled reposition");
        }
    }

    /// Animation-frame callback. Runs at most one coalesced reposition and
    /// advances the badge effect. Returns true while another frame is
    /// needed; the host should keep scheduling frames until it goes false.
    pub fn on_frame(&mut self, page: &mut dyn PageSurface, now_ms: f64) -> bool {
        if self.scheduler.begin_frame() {
            self.service_reposition(page);
        }

        let was_animating = self.indicator.is_animating();
        let animating = self.indicator.tick(page, now_ms);
        if was_animating && !animating {
            self.events.emit(ControllerEvent::IndicatorHidden);
        }

        animating || self.scheduler.is_pending()
    }

    /// Whether the host should have a frame scheduled right now.
    pub fn wants_frame(&self) -> bool {
        self.scheduler.is_pending() || self.indicator.is_animating()
    }

    fn show_indicator(&mut self, page: &mut dyn PageSurface, rep: MediaId, rate: f64, now_ms: f64) {
        self.indicator.show(page, rate, now_ms);
        if let Some(bounds) = page.media_bounds(rep) {
            self.indicator.reposition(page, bounds);
        }
        self.events.emit(ControllerEvent::IndicatorShown { rate });
    }

    fn seek(&mut self, page: &mut dyn PageSurface, event: &KeyupEvent, digit: u8) {
        // Never shadow the host player's own digit shortcuts
        if event.target_in_media {
            return;
        }
        let Some(id) = representative_media(page) else {
            return;
        };
        let Some(duration) = page.duration(id) else {
            return;
        };
        if !duration.is_finite() || duration <= 0.0 {
            trace!("media duration unknown, skipping seek");
            return;
        }
        let seconds = f64::from(digit) / 10.0 * duration;
        page.set_current_time(id, seconds);
        debug!("seek to {seconds:.1}s ({}0%)", digit);
        self.events
            .emit(ControllerEvent::SeekApplied { media: id, seconds });
    }

    /// Recompute the badge target after a layout change. A missing badge is
    /// transient (nothing shown yet): skip and let the next trigger retry.
    fn service_reposition(&mut self, page: &mut dyn PageSurface) {
        if !page.badge_exists() {
            trace!("badge not created yet, skipping reposition");
            return;
        }
        match first_in_viewport(page) {
            Some(id) => {
                if let Some(bounds) = page.media_bounds(id) {
                    self.indicator.reposition(page, bounds);
                }
            }
            None => {
                if self.indicator.hide(page) {
                    debug!("no media in viewport, hiding indicator");
                    self.events.emit(ControllerEvent::IndicatorHidden);
                }
            }
        }
    }

    /// Best-effort HD upgrade after a cycle-type rate change. Absence or
    /// failure of the collaborator never disturbs the rate change.
    fn upgrade_quality(&mut self, page: &mut dyn PageSurface) {
        let Some(quality) = page.quality_control() else {
            debug!("quality control not available");
            return;
        };
        match try_upgrade(quality) {
            Ok(Some(level)) => {
                info!("playback quality upgraded to {level}");
                self.events.emit(ControllerEvent::QualityUpgraded { level });
            }
            Ok(None) => {}
            Err(err) => warn!("quality upgrade failed: {err:#}"),
        }
    }
}

impl Default for SpeedController {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Set the rate on every media element. Returns how many were touched.
fn apply_rate(page: &mut dyn PageSurface, rate: f64) -> usize {
    let ids = page.media_ids();
    for id in &ids {
        page.set_playback_rate(*id, rate);
    }
    ids.len()
}

/// Pick the best HD level (1080 preferred, 720 fallback) and apply it when
/// it differs from the current one. `Ok(None)` means nothing to do.
fn try_upgrade(quality: &mut dyn QualityControl) -> Result<Option<String>> {
    let levels = quality.available_levels()?;
    let pick = levels
        .iter()
        .find(|l| l.contains("1080"))
        .or_else(|| levels.iter().find(|l| l.contains("720")))
        .cloned();
    let Some(level) = pick else {
        debug!("no HD quality level available");
        return Ok(None);
    };
    if level == quality.current_quality()? {
        return Ok(None);
    }
    quality.set_quality(&level)?;
    Ok(Some(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::speed::CycleMode;
    use crate::events::Modifiers;
    use crate::headless::{HeadlessPage, ScriptedQuality};
    use crate::page::{ActiveElement, Rect};

    const VIDEO_BOUNDS: Rect = Rect::new(100.0, 100.0, 640.0, 360.0);

    fn page_with_video() -> (HeadlessPage, MediaId) {
        let mut page = HeadlessPage::new();
        let id = page.add_media(100.0, VIDEO_BOUNDS);
        (page, id)
    }

    fn toggle_controller() -> SpeedController {
        SpeedController::new(Config {
            cycle_mode: CycleMode::Toggle,
            ..Config::default()
        })
    }

    fn press(controller: &mut SpeedController, page: &mut HeadlessPage, key: char, at_ms: f64) {
        controller.on_keyup(page, &KeyupEvent::new(key, at_ms));
    }

    #[test]
    fn test_toggle_end_to_end() {
        let (mut page, id) = page_with_video();
        let mut controller = toggle_controller();

        press(&mut controller, &mut page, '`', 0.0);
        assert_eq!(page.media(id).unwrap().playback_rate, 2.0);
        let badge = page.badge().unwrap();
        assert_eq!(badge.text, "2x");
        assert!(badge.visible);
        assert_eq!(badge.center, Some(VIDEO_BOUNDS.center()));

        // Drive the fade to completion; badge hides automatically
        assert!(controller.wants_frame());
        assert!(controller.on_frame(&mut page, 500.0));
        assert!(!controller.on_frame(&mut page, 1000.0));
        assert!(!page.badge().unwrap().visible);
        assert!(!controller.wants_frame());

        // Second press toggles back to normal speed
        press(&mut controller, &mut page, '`', 2000.0);
        assert_eq!(page.media(id).unwrap().playback_rate, 1.0);
        assert_eq!(page.badge().unwrap().text, "1x");
    }

    #[test]
    fn test_cycle_walks_ladder_and_wraps() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();

        let mut seen = Vec::new();
        for i in 0..5 {
            press(&mut controller, &mut page, '\'', i as f64 * 200.0);
            seen.push(page.media(id).unwrap().playback_rate);
        }
        assert_eq!(seen, vec![1.25, 1.5, 1.75, 2.0, 1.0]);
    }

    #[test]
    fn test_fixed_rate_chords() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();

        let cases = [
            (Modifiers::ctrl(), 3.0),
            (Modifiers::meta(), 4.0),
            (Modifiers::alt(), 5.0),
        ];
        for (i, (mods, expected)) in cases.into_iter().enumerate() {
            let event = KeyupEvent::new('`', i as f64 * 200.0).with_modifiers(mods);
            controller.on_keyup(&mut page, &event);
            assert_eq!(page.media(id).unwrap().playback_rate, expected);
            assert_eq!(page.badge().unwrap().text, format!("{expected}x"));
        }
    }

    #[test]
    fn test_debounce_swallows_duplicate_press() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        press(&mut controller, &mut page, '`', 50.0);
        assert_eq!(page.media(id).unwrap().playback_rate, 1.25);

        press(&mut controller, &mut page, '`', 150.0);
        assert_eq!(page.media(id).unwrap().playback_rate, 1.5);
    }

    #[test]
    fn test_unrelated_typing_does_not_advance_debounce() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        // Non-shortcut key right before the next press must not reset the
        // window measured from the last accepted shortcut
        press(&mut controller, &mut page, 'a', 140.0);
        press(&mut controller, &mut page, '`', 150.0);
        assert_eq!(page.media(id).unwrap().playback_rate, 1.5);
    }

    #[test]
    fn test_focus_guard_suppresses_everything() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();

        for focus in [
            ActiveElement::TextInput,
            ActiveElement::TextArea,
            ActiveElement::ContentEditable,
        ] {
            page.set_active_element(focus);
            press(&mut controller, &mut page, '`', 0.0);
            assert_eq!(page.media(id).unwrap().playback_rate, 1.0, "{focus:?}");
            assert!(page.badge().is_none());
        }
    }

    #[test]
    fn test_rate_applies_to_every_media_element() {
        let mut page = HeadlessPage::new();
        let first = page.add_media(100.0, VIDEO_BOUNDS);
        let second = page.add_media(200.0, Rect::new(100.0, 900.0, 640.0, 360.0));
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        assert_eq!(page.media(first).unwrap().playback_rate, 1.25);
        assert_eq!(page.media(second).unwrap().playback_rate, 1.25);
        // Badge sits over the in-viewport element
        assert_eq!(page.badge().unwrap().center, Some(VIDEO_BOUNDS.center()));
    }

    #[test]
    fn test_missing_media_is_silent() {
        let mut page = HeadlessPage::new();
        let mut controller = SpeedController::default();
        press(&mut controller, &mut page, '`', 0.0);
        assert!(page.badge().is_none());
        assert!(!controller.wants_frame());
    }

    #[test]
    fn test_second_press_restarts_single_animation() {
        let (mut page, _) = page_with_video();
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        press(&mut controller, &mut page, '`', 200.0);
        assert_eq!(controller.indicator().active_handle(), Some(1));
        assert_eq!(page.badge().unwrap().text, "1.5x");
    }

    #[test]
    fn test_bad_config_durations_are_sanitized() {
        let (mut page, _) = page_with_video();
        let mut controller = SpeedController::new(Config {
            debounce_ms: f64::NAN,
            fade_duration_ms: 0.0,
            ..Config::default()
        });
        assert_eq!(controller.config().debounce_ms, 100.0);
        assert_eq!(controller.config().fade_duration_ms, 1000.0);

        // Engine behaves on default timings end to end
        press(&mut controller, &mut page, '`', 0.0);
        press(&mut controller, &mut page, '`', 50.0); // debounced
        assert!(controller.on_frame(&mut page, 500.0));
        assert!(page.badge().unwrap().opacity.is_finite());
        assert!(!controller.on_frame(&mut page, 1000.0));
        assert!(!page.badge().unwrap().visible);
    }

    #[test]
    fn test_seek_disabled_by_default() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();
        press(&mut controller, &mut page, '5', 0.0);
        assert_eq!(page.media(id).unwrap().current_time, 0.0);
    }

    #[test]
    fn test_seek_jumps_to_fraction_of_duration() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::new(Config {
            seek_enabled: true,
            ..Config::default()
        });

        press(&mut controller, &mut page, '5', 0.0);
        assert_eq!(page.media(id).unwrap().current_time, 50.0);
        // Seeking leaves the rate alone and shows no badge
        assert_eq!(page.media(id).unwrap().playback_rate, 1.0);
        assert!(page.badge().is_none());
    }

    #[test]
    fn test_seek_guard_inside_media_subtree() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::new(Config {
            seek_enabled: true,
            ..Config::default()
        });

        let event = KeyupEvent::new('5', 0.0).inside_media();
        controller.on_keyup(&mut page, &event);
        assert_eq!(page.media(id).unwrap().current_time, 0.0);

        // The guard applies to seeks only, not rate changes
        let event = KeyupEvent::new('`', 200.0).inside_media();
        controller.on_keyup(&mut page, &event);
        assert_eq!(page.media(id).unwrap().playback_rate, 1.25);
    }

    #[test]
    fn test_quality_upgraded_after_cycle() {
        let (mut page, _) = page_with_video();
        page.set_quality_control(ScriptedQuality::new(&["hd1080", "hd720", "large"], "large"));
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        assert_eq!(page.quality().unwrap().current, "hd1080");
    }

    #[test]
    fn test_quality_falls_back_to_720() {
        let (mut page, _) = page_with_video();
        page.set_quality_control(ScriptedQuality::new(&["hd720", "large", "medium"], "medium"));
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        assert_eq!(page.quality().unwrap().current, "hd720");
    }

    #[test]
    fn test_quality_untouched_without_hd_level() {
        let (mut page, _) = page_with_video();
        page.set_quality_control(ScriptedQuality::new(&["small", "medium"], "small"));
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        assert_eq!(page.quality().unwrap().current, "small");
    }

    #[test]
    fn test_quality_skipped_for_fixed_rate() {
        let (mut page, _) = page_with_video();
        page.set_quality_control(ScriptedQuality::new(&["hd1080"], "large"));
        let mut controller = SpeedController::default();

        let event = KeyupEvent::new('`', 0.0).with_modifiers(Modifiers::ctrl());
        controller.on_keyup(&mut page, &event);
        assert_eq!(page.quality().unwrap().current, "large");
    }

    #[test]
    fn test_quality_failure_never_blocks_rate_change() {
        let (mut page, id) = page_with_video();
        page.set_quality_control(ScriptedQuality::failing());
        let mut controller = SpeedController::default();

        press(&mut controller, &mut page, '`', 0.0);
        assert_eq!(page.media(id).unwrap().playback_rate, 1.25);
        assert_eq!(page.badge().unwrap().text, "1.25x");
    }

    #[test]
    fn test_layout_signals_coalesce_into_one_reposition() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();
        press(&mut controller, &mut page, '`', 0.0);

        // Element moved; a burst of notifications arrives before the frame
        let moved = Rect::new(300.0, 200.0, 640.0, 360.0);
        page.set_media_bounds(id, moved);
        controller.on_layout_signal(LayoutSignal::DomMutated);
        controller.on_layout_signal(LayoutSignal::IntersectionChanged);
        controller.on_layout_signal(LayoutSignal::FullscreenToggled);

        controller.on_frame(&mut page, 16.0);
        assert_eq!(page.badge().unwrap().center, Some(moved.center()));

        // Flag drained: a further move without a signal is not picked up
        page.set_media_bounds(id, Rect::new(500.0, 300.0, 640.0, 360.0));
        controller.on_frame(&mut page, 32.0);
        assert_eq!(page.badge().unwrap().center, Some(moved.center()));
    }

    #[test]
    fn test_reposition_hides_badge_when_nothing_visible() {
        let (mut page, id) = page_with_video();
        let mut controller = SpeedController::default();
        press(&mut controller, &mut page, '`', 0.0);
        assert!(page.badge().unwrap().visible);

        page.set_media_bounds(id, Rect::new(0.0, 5000.0, 640.0, 360.0));
        controller.on_layout_signal(LayoutSignal::IntersectionChanged);
        controller.on_frame(&mut page, 16.0);
        assert!(!page.badge().unwrap().visible);
    }

    #[test]
    fn test_reposition_before_badge_exists_is_transient() {
        let (mut page, _) = page_with_video();
        let mut controller = SpeedController::default();

        controller.on_layout_signal(LayoutSignal::DomMutated);
        assert!(controller.wants_frame());
        assert!(!controller.on_frame(&mut page, 16.0));
        assert!(!page.badge_exists());
    }

    #[test]
    fn test_notifications_reach_subscriber() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let (mut page, _) = page_with_video();
        let mut controller =
            SpeedController::with_events(Config::default(), ControllerEventSender::new(tx));

        press(&mut controller, &mut page, '`', 0.0);
        let events: Vec<ControllerEvent> = rx.try_iter().collect();
        assert!(events.contains(&ControllerEvent::RateChanged {
            rate: 1.25,
            targets: 1
        }));
        assert!(events.contains(&ControllerEvent::IndicatorShown { rate: 1.25 }));

        // Fade completion reports the badge hiding
        controller.on_frame(&mut page, 1000.0);
        let events: Vec<ControllerEvent> = rx.try_iter().collect();
        assert!(events.contains(&ControllerEvent::IndicatorHidden));
    }
}
