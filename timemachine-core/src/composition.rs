use std::fmt;

use serde::Serialize;

use timemachine_types::ExploitRecord;

use crate::actuarial::{Adjustment, SCORE_CEILING};

/// Score waterfall: raw score, multipliers, mitigations, actuarial step, final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComposition {
    pub raw_risk_score: i32,
    /// Sum of multiplier `added_points`; shown only when positive.
    pub multiplier_total: i32,
    pub mitigation_credit: i32,
    pub actuarial: ActuarialLine,
    pub final_score: i32,
    /// The unclamped sum exceeded the ceiling.
    pub capped: bool,
}

/// The actuarial row of the waterfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuarialLine {
    /// Unclamped table delta.
    Delta(i32),
    /// Base analysis already at maximum risk; the overlay is not applied.
    NotApplicable,
}

impl fmt::Display for ActuarialLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delta(d) if *d > 0 => write!(f, "+{d}"),
            Self::Delta(d) => write!(f, "{d}"),
            Self::NotApplicable => write!(f, "n/a"),
        }
    }
}

impl ScoreComposition {
    pub fn build(record: &ExploitRecord, adjustment: &Adjustment) -> Self {
        let actuarial = if record.actuarial.show_max_risk_message {
            ActuarialLine::NotApplicable
        } else {
            ActuarialLine::Delta(adjustment.delta)
        };
        Self {
            raw_risk_score: record.composition.raw_risk_score,
            multiplier_total: record.composition.multiplier_total(),
            mitigation_credit: record.composition.mitigation_credit,
            actuarial,
            final_score: adjustment.current_score,
            capped: adjustment.raw_score > SCORE_CEILING,
        }
    }
}
