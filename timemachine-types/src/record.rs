use serde::{Deserialize, Serialize};

use crate::actuarial::ActuarialBlock;
use crate::finding::{Finding, Signal};

/// One pre-exploit forensic analysis bundle.
///
/// The `id` is assigned by the catalogue (file stem or bundled key) and is
/// not expected in the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploitRecord {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "exploit_meta", alias = "meta")]
    pub meta: ExploitMeta,
    pub chain_display_name: String,
    pub scan_result: ScanSummary,
    pub composition: Composition,
    pub actuarial: ActuarialBlock,
    #[serde(default)]
    pub primitive_count: u32,
    #[serde(default)]
    pub context_data: ContextData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Narrative>,
}

impl ExploitRecord {
    pub fn findings(&self) -> &[Finding] {
        &self.scan_result.risk_factors
    }

    pub fn signals(&self) -> &[Signal] {
        &self.scan_result.mitigations_and_signals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploitMeta {
    pub name: String,
    pub attack_vector: String,
    pub loss_amount_usd: f64,
    /// ISO-8601 date of the exploit.
    pub date: String,
}

/// Scanner output. Field names follow the upstream scanner's PascalCase export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    #[serde(rename = "ContractAddress", alias = "contract_address")]
    pub contract_address: String,
    /// Raw score before actuarial refinement (0-100).
    #[serde(rename = "RiskScore", alias = "risk_score")]
    pub risk_score: i32,
    #[serde(rename = "RiskFactors", alias = "risk_factors", default)]
    pub risk_factors: Vec<Finding>,
    #[serde(
        rename = "MitigationsAndSignals",
        alias = "mitigations_and_signals",
        default
    )]
    pub mitigations_and_signals: Vec<Signal>,
    #[serde(rename = "ScanDate", alias = "scan_date")]
    pub scan_date: String,
    #[serde(rename = "ScanDuration", alias = "scan_duration_seconds")]
    pub scan_duration_seconds: f64,
}

/// Inputs to the score-composition waterfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub raw_risk_score: i32,
    #[serde(default)]
    pub mitigation_credit: i32,
    #[serde(default)]
    pub multiplier_details: Vec<MultiplierDetail>,
}

impl Composition {
    pub fn multiplier_total(&self) -> i32 {
        self.multiplier_details
            .iter()
            .fold(0, |total: i32, m| total.saturating_add(m.added_points))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierDetail {
    pub added_points: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

/// Post-mortem write-up shown under the findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub breakdown: Breakdown,
    #[serde(default)]
    pub sections: Vec<NarrativeSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub vulnerability: String,
    /// Attack steps as `"1) ... 2) ..."` text.
    pub steps: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub title: String,
    pub text: String,
}
