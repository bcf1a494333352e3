//! Engine configuration.
//!
//! Everything historically hard-coded in one script version or another
//! (debounce window, ladder, effect choice, opacities) is a field here with
//! the latest behavior as default. Hosts hand settings over as a JSON blob;
//! unknown-good values degrade to defaults rather than failing startup.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::debounce::DEFAULT_DEBOUNCE_MS;
use crate::core::indicator::EffectKind;
use crate::core::speed::{CycleMode, DEFAULT_LADDER, SpeedLadder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum spacing between accepted shortcut events, milliseconds.
    pub debounce_ms: f64,

    /// Cycle ladder steps; validated into a [`SpeedLadder`] at startup.
    pub ladder: Vec<f64>,

    /// Toggle (legacy 1x/2x) or ladder cycling.
    pub cycle_mode: CycleMode,

    /// Badge retire effect.
    pub effect: EffectKind,

    /// Digit-key seeking. Off by default: later script versions dropped it
    /// and the default tracks them.
    pub seek_enabled: bool,

    /// Attempt an HD quality upgrade after a cycle-type rate change.
    pub upgrade_quality: bool,

    /// Badge opacity while showing.
    pub show_opacity: f64,

    /// Opacity the fade effect decays from.
    pub fade_start_opacity: f64,

    /// Fade effect duration, milliseconds.
    pub fade_duration_ms: f64,

    /// Pulse effect duration, milliseconds.
    pub pulse_duration_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            ladder: DEFAULT_LADDER.steps().to_vec(),
            cycle_mode: CycleMode::default(),
            effect: EffectKind::default(),
            seek_enabled: false,
            upgrade_quality: true,
            show_opacity: 0.8,
            fade_start_opacity: 0.9,
            fade_duration_ms: 1000.0,
            pulse_duration_ms: 900.0,
        }
    }
}

impl Config {
    /// Parse a host-provided settings blob. Missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid engine configuration")
    }

    /// Validated ladder; invalid steps fall back to the default ladder so a
    /// bad settings blob never disables the feature.
    pub fn ladder_or_default(&self) -> SpeedLadder {
        match SpeedLadder::new(self.ladder.clone()) {
            Ok(ladder) => ladder,
            Err(err) => {
                warn!("invalid speed ladder in config ({err}), using default");
                DEFAULT_LADDER.clone()
            }
        }
    }

    /// Copy with every duration and opacity replaced by its default when the
    /// given value is unusable (non-finite, non-positive, opacity out of
    /// range). A zero duration would stall the effect math at NaN progress,
    /// so timings get the same fallback treatment as the ladder.
    pub fn sanitized(&self) -> Config {
        let defaults = Config::default();
        Config {
            debounce_ms: duration_or(self.debounce_ms, defaults.debounce_ms, "debounce_ms"),
            fade_duration_ms: duration_or(
                self.fade_duration_ms,
                defaults.fade_duration_ms,
                "fade_duration_ms",
            ),
            pulse_duration_ms: duration_or(
                self.pulse_duration_ms,
                defaults.pulse_duration_ms,
                "pulse_duration_ms",
            ),
            show_opacity: opacity_or(self.show_opacity, defaults.show_opacity, "show_opacity"),
            fade_start_opacity: opacity_or(
                self.fade_start_opacity,
                defaults.fade_start_opacity,
                "fade_start_opacity",
            ),
            ..self.clone()
        }
    }
}

fn duration_or(value: f64, default: f64, name: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("invalid {name} in config ({value}), using {default}");
        default
    }
}

fn opacity_or(value: f64, default: f64, name: &str) -> f64 {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        value
    } else {
        warn!("invalid {name} in config ({value}), using {default}");
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_blob_yields_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.debounce_ms, 100.0);
        assert!(!config.seek_enabled);
    }

    #[test]
    fn test_partial_blob_overrides_fields() {
        let config =
            Config::from_json(r#"{"cycle_mode": "toggle", "effect": "pulse", "seek_enabled": true}"#)
                .unwrap();
        assert_eq!(config.cycle_mode, CycleMode::Toggle);
        assert_eq!(config.effect, EffectKind::Pulse);
        assert!(config.seek_enabled);
        // Untouched fields keep defaults
        assert_eq!(config.ladder, DEFAULT_LADDER.steps());
    }

    #[test]
    fn test_malformed_blob_is_an_error() {
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn test_invalid_ladder_falls_back_to_default() {
        let config = Config {
            ladder: vec![2.0, 1.0],
            ..Config::default()
        };
        assert_eq!(config.ladder_or_default(), *DEFAULT_LADDER);
    }

    #[test]
    fn test_custom_ladder_survives_validation() {
        let config = Config {
            ladder: vec![1.0, 2.0, 4.0],
            ..Config::default()
        };
        assert_eq!(config.ladder_or_default().steps(), &[1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_invalid_durations_fall_back_to_defaults() {
        let config = Config {
            debounce_ms: f64::NAN,
            fade_duration_ms: 0.0,
            pulse_duration_ms: -5.0,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.debounce_ms, 100.0);
        assert_eq!(config.fade_duration_ms, 1000.0);
        assert_eq!(config.pulse_duration_ms, 900.0);
    }

    #[test]
    fn test_invalid_opacities_fall_back_to_defaults() {
        let config = Config {
            show_opacity: 1.5,
            fade_start_opacity: f64::NAN,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.show_opacity, 0.8);
        assert_eq!(config.fade_start_opacity, 0.9);
    }

    #[test]
    fn test_sanitize_keeps_good_values() {
        let config = Config {
            debounce_ms: 250.0,
            fade_duration_ms: 500.0,
            show_opacity: 0.5,
            seek_enabled: true,
            ..Config::default()
        };
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            seek_enabled: true,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }
}
