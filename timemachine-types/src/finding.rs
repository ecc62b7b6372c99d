use std::fmt;

use serde::{Deserialize, Serialize};

/// Positive-signal key reserved for the residual baseline line.
pub const RESIDUAL_BASELINE_KEY: &str = "residual_baseline";
/// Actuarial-intelligence key whose text is computed from the live score.
pub const ACTUARIAL_ANALYSIS_KEY: &str = "actuarial_analysis";

/// A single risk factor reported by the upstream scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub description: String,
    /// Points contributed to the raw score.
    pub score: i32,
    /// Explicit classification. Filled in at ingestion when the source omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FindingKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cir_explanation: Option<CirExplanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_investors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_developers: Option<String>,
}

impl Finding {
    /// The tagged kind, or the description-based classification for untagged findings.
    pub fn kind(&self) -> FindingKind {
        self.kind
            .unwrap_or_else(|| FindingKind::classify(&self.description))
    }

    pub fn is_multiplier(&self) -> bool {
        self.kind() == FindingKind::Multiplier
    }

    /// Audience guidance as `(investor, developer)`.
    ///
    /// The structured `cir_explanation` wins; the flat explanation fields are
    /// used only when it is absent and an investor text exists.
    pub fn guidance(&self) -> Option<(&str, &str)> {
        if let Some(ref cir) = self.cir_explanation {
            return Some((&cir.guidance.investor, &cir.guidance.developer));
        }
        self.explanation_investors.as_deref().map(|investor| {
            (
                investor,
                self.explanation_developers.as_deref().unwrap_or(""),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CirExplanation {
    pub guidance: Guidance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    pub investor: String,
    pub developer: String,
}

/// Whether a finding is an independent factor or a compounding risk cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Regular,
    Multiplier,
}

impl FindingKind {
    /// Compatibility rule for untagged scanner output: a description naming a
    /// multiplier or a cluster (case-insensitive) marks a multiplier finding.
    pub fn classify(description: &str) -> Self {
        let lower = description.to_lowercase();
        if lower.contains("multiplier") || lower.contains("cluster") {
            Self::Multiplier
        } else {
            Self::Regular
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Multiplier => write!(f, "multiplier"),
        }
    }
}

/// A non-finding annotation: mitigation credit, advisory note or actuarial commentary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_saved: Option<u32>,
}

impl Signal {
    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    pub fn is_residual_baseline(&self) -> bool {
        self.kind == SignalKind::PositiveSignal && self.has_key(RESIDUAL_BASELINE_KEY)
    }

    /// Positive signal that counts toward mitigation credit.
    pub fn is_mitigation(&self) -> bool {
        self.kind == SignalKind::PositiveSignal && !self.has_key(RESIDUAL_BASELINE_KEY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    PositiveSignal,
    ActuarialIntelligence,
    AdvisorySignal,
    /// Signal types this build does not know; ignored by every renderer.
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(desc: &str) -> Finding {
        Finding {
            description: desc.into(),
            score: 10,
            kind: None,
            cir_explanation: None,
            explanation_investors: None,
            explanation_developers: None,
        }
    }

    #[test]
    fn classify_by_description() {
        assert_eq!(
            FindingKind::classify("Reentrancy Multiplier (+12 pts)"),
            FindingKind::Multiplier
        );
        assert_eq!(
            FindingKind::classify("Oracle risk CLUSTER"),
            FindingKind::Multiplier
        );
        assert_eq!(
            FindingKind::classify("Unchecked external call"),
            FindingKind::Regular
        );
    }

    #[test]
    fn explicit_kind_wins() {
        let mut f = finding("Liquidity cluster overlap");
        f.kind = Some(FindingKind::Regular);
        assert!(!f.is_multiplier());
        f.kind = None;
        assert!(f.is_multiplier());
    }

    #[test]
    fn guidance_prefers_structured_explanation() {
        let mut f = finding("x");
        assert!(f.guidance().is_none());

        f.explanation_investors = Some("inv".into());
        assert_eq!(f.guidance(), Some(("inv", "")));

        f.cir_explanation = Some(CirExplanation {
            guidance: Guidance {
                investor: "cir-inv".into(),
                developer: "cir-dev".into(),
            },
        });
        assert_eq!(f.guidance(), Some(("cir-inv", "cir-dev")));
    }

    #[test]
    fn signal_kinds_parse() {
        let s: Signal = serde_json::from_str(
            r#"{"type": "positive_signal", "key": "residual_baseline", "points_saved": 3}"#,
        )
        .unwrap();
        assert!(s.is_residual_baseline());
        assert!(!s.is_mitigation());

        let unknown: Signal = serde_json::from_str(r#"{"type": "telemetry_blip"}"#).unwrap();
        assert_eq!(unknown.kind, SignalKind::Other);
    }
}
