// ---------------------------------------------------------------------------
// Actuarial adjustment model
// ---------------------------------------------------------------------------
//
// The slider selects one of eleven pre-computed deltas (0%, 10%, ... 100%).
// The delta is added to the pre-actuarial score and the sum is clamped to
// [SCORE_FLOOR, SCORE_CEILING]. The delta itself is reported unclamped so
// composition views show the table value even when the score saturates.

use std::fmt;

use serde::{Deserialize, Serialize};

use timemachine_types::{ActuarialBlock, SLIDER_STEPS};

use crate::error::ActuarialError;

/// Lowest score ever displayed.
pub const SCORE_FLOOR: i32 = 5;
/// Highest score ever displayed.
pub const SCORE_CEILING: i32 = 100;

/// Actuarial weighting in percent: 0-100 in steps of 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Weight(u8);

impl Weight {
    /// Weight applied whenever a record is (re-)selected.
    pub const DEFAULT: Weight = Weight(30);
    pub const MIN: Weight = Weight(0);
    pub const MAX: Weight = Weight(100);

    /// Validate a percentage. Values are rejected, never clamped.
    pub fn new(percent: u32) -> Result<Self, ActuarialError> {
        if percent > 100 {
            return Err(ActuarialError::InvalidArgument(format!(
                "weight {percent}% is above 100%"
            )));
        }
        if percent % 10 != 0 {
            return Err(ActuarialError::InvalidArgument(format!(
                "weight {percent}% is not a multiple of 10"
            )));
        }
        Ok(Self(percent as u8))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Index into the slider delta table (0..=10).
    pub fn step(self) -> u8 {
        self.0 / 10
    }

    /// Every valid weight, ascending.
    pub fn all() -> impl Iterator<Item = Weight> {
        (0..SLIDER_STEPS as u8).map(|s| Weight(s * 10))
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Weight {
    type Error = ActuarialError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<Weight> for u32 {
    fn from(w: Weight) -> u32 {
        u32::from(w.0)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Result of applying the actuarial overlay at one weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    /// Displayed score, clamped to [SCORE_FLOOR, SCORE_CEILING].
    pub current_score: i32,
    /// Table delta at the chosen step (0 when absent), before clamping.
    pub delta: i32,
    /// `pre_actuarial_score + delta`, unclamped.
    pub raw_score: i32,
    /// `base + delta`: the refined loss-risk index shown beside the base.
    pub refined_value: i32,
}

impl Adjustment {
    /// Whether clamping changed the score.
    pub fn clamped(&self) -> bool {
        self.current_score != self.raw_score
    }
}

/// Apply the overlay for `weight`.
pub fn adjust(actuarial: &ActuarialBlock, weight: Weight) -> Adjustment {
    let delta = actuarial.slider_deltas.get(weight.step());
    let raw_score = actuarial.pre_actuarial_score.saturating_add(delta);
    Adjustment {
        current_score: raw_score.clamp(SCORE_FLOOR, SCORE_CEILING),
        delta,
        raw_score,
        refined_value: actuarial.base.saturating_add(delta),
    }
}

/// Adjustment at every slider step, ascending by weight.
pub fn sweep(actuarial: &ActuarialBlock) -> Vec<(Weight, Adjustment)> {
    Weight::all().map(|w| (w, adjust(actuarial, w))).collect()
}
