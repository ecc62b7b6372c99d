use std::fmt;

use serde::Serialize;

/// Three-band scoring legend: 0-25 safe, 26-65 caution, 66-100 high risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: i32) -> Self {
        if score >= 66 {
            Self::High
        } else if score >= 26 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Dashboard headline under the score.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "SMOKING GUN",
            Self::Medium => "CAUTION",
            Self::Low => "MINIMAL",
        }
    }

    /// Legend wording.
    pub fn description(self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Medium => "Caution",
            Self::Low => "Safe",
        }
    }

    /// Label printed beside the score on the report.
    pub fn report_label(self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Medium => "Moderate Risk",
            Self::Low => "Low Risk",
        }
    }

    /// CSS category used by the report stylesheet.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
