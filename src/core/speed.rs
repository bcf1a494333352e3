//! Speed ladder and rate policy.
//!
//! The cycle shortcut walks an ordered ladder of allowed playback rates;
//! the legacy toggle policy just flips between normal and double speed.
//! Fixed-rate shortcuts bypass both and are handled by the controller.

use anyhow::{Result, ensure};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Tolerance for matching the element's reported rate against ladder entries.
/// Hosts hand back floats that went through their own arithmetic.
pub const RATE_EPS: f64 = 1e-6;

/// Default cycle ladder.
pub static DEFAULT_LADDER: Lazy<SpeedLadder> = Lazy::new(|| {
    SpeedLadder::new(vec![1.0, 1.25, 1.5, 1.75, 2.0]).expect("default ladder is valid")
});

/// How the un-modified speed shortcut changes the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    /// Flip between 1x and 2x (legacy behavior).
    Toggle,
    /// Advance to the next ladder entry, wrapping to normal speed.
    #[default]
    Ladder,
}

/// Validated ordered list of cycle rates.
///
/// Invariants: non-empty, strictly increasing, first entry is the neutral
/// rate 1.0 (cycling always has a way back to normal speed).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedLadder {
    steps: Vec<f64>,
}

impl SpeedLadder {
    pub fn new(steps: Vec<f64>) -> Result<Self> {
        ensure!(!steps.is_empty(), "speed ladder must not be empty");
        ensure!(
            steps.iter().all(|s| s.is_finite() && *s > 0.0),
            "ladder rates must be finite and positive"
        );
        ensure!(
            (steps[0] - 1.0).abs() < RATE_EPS,
            "first ladder entry must be the neutral rate 1.0, got {}",
            steps[0]
        );
        ensure!(
            steps.windows(2).all(|w| w[0] < w[1]),
            "ladder rates must be strictly increasing"
        );
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    /// The normal-speed entry the cycle wraps back to.
    pub fn neutral(&self) -> f64 {
        self.steps[0]
    }

    /// Next rate after `current`. Unknown rates and the last entry both wrap
    /// to the neutral rate.
    pub fn next_after(&self, current: f64) -> f64 {
        match self
            .steps
            .iter()
            .position(|s| (s - current).abs() < RATE_EPS)
        {
            Some(idx) if idx + 1 < self.steps.len() => self.steps[idx + 1],
            _ => self.neutral(),
        }
    }
}

/// New rate for a toggle-or-cycle action given the current rate.
pub fn next_rate(mode: CycleMode, ladder: &SpeedLadder, current: f64) -> f64 {
    match mode {
        CycleMode::Toggle => {
            if (current - 1.0).abs() < RATE_EPS {
                2.0
            } else {
                1.0
            }
        }
        CycleMode::Ladder => ladder.next_after(current),
    }
}
