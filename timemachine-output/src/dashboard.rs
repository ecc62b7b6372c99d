use timemachine_core::{ActuarialLine, Analysis, RiskBand};
use timemachine_types::{
    Finding, format_date, format_loss, format_vector, split_attack_steps, strip_pts,
};

use crate::traits::{AnalysisFormatter, OutputError};

const RULE: &str =
    "--------------------------------------------------------------------------------\n";

const MAX_RISK_NOTE: &str = "Maximum risk score reached (100). The actuarial overlay confirms \
    this contract's risk profile is at the ceiling. All historical cohort data supports this \
    assessment.";

const METHODOLOGY_NOTE: &str = "The actuarial overlay applies Bayesian refinement calibrated \
    against 1,400+ historical exploit incidents across DeFi, bridges, lending, and governance \
    protocols. Each finding is mapped to a statistical cohort with known frequency and severity \
    data, producing a probabilistic risk adjustment grounded in real-world outcomes. Use the \
    --weight option to specify the weighting of this actuarial overlay, adjustable in 10% \
    increments from 0% (base score only) to 100% (full actuarial refinement).";

/// Strip terminal control characters from record text to prevent escape injection.
fn sanitize_terminal(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                '?'
            } else {
                c
            }
        })
        .collect()
}

/// Plain-text rendering of the three-panel dashboard: command bar, score
/// waterfall, findings with post-mortem, contract and actuarial intel, status bar.
pub struct DashboardFormatter {
    show_guidance: bool,
}

impl DashboardFormatter {
    pub fn new(show_guidance: bool) -> Self {
        Self { show_guidance }
    }
}

impl Default for DashboardFormatter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl AnalysisFormatter for DashboardFormatter {
    fn format(&self, analysis: &Analysis<'_>) -> Result<String, OutputError> {
        let mut output = String::new();
        command_bar(&mut output, analysis);
        score_panel(&mut output, analysis);
        self.findings_panel(&mut output, analysis);
        intel_panel(&mut output, analysis);
        status_bar(&mut output, analysis);
        Ok(output)
    }
}

fn command_bar(output: &mut String, analysis: &Analysis<'_>) {
    let record = analysis.record;
    output.push_str(&format!(
        "{}  [{}]  {}  {}\n",
        sanitize_terminal(&record.meta.name),
        sanitize_terminal(&record.chain_display_name),
        format_loss(record.meta.loss_amount_usd),
        sanitize_terminal(&record.scan_result.contract_address),
    ));
    output.push_str(RULE);
}

fn score_panel(output: &mut String, analysis: &Analysis<'_>) {
    let record = analysis.record;
    let score = analysis.current_score();
    let composition = analysis.composition();

    output.push_str(&format!(
        "[{}] [{}] [{}]\n\n",
        format_vector(&record.meta.attack_vector),
        format_loss(record.meta.loss_amount_usd),
        sanitize_terminal(&format_date(&record.meta.date)),
    ));
    output.push_str(&format!(
        "RISK SCORE  {score}  {}\n\n",
        RiskBand::from_score(score).label()
    ));

    output.push_str("Score Composition\n");
    output.push_str(&format!(
        "  {:<24}{:>8}\n",
        "Raw Risk Score", composition.raw_risk_score
    ));
    if composition.multiplier_total > 0 {
        output.push_str(&format!(
            "  {:<24}{:>8}\n",
            "Cluster Multipliers",
            format!("+{}", composition.multiplier_total)
        ));
    }
    let mitigations = if composition.mitigation_credit > 0 {
        format!("-{}", composition.mitigation_credit)
    } else {
        "0".to_string()
    };
    output.push_str(&format!("  {:<24}{:>8}\n", "Total Mitigations", mitigations));
    output.push_str(&format!(
        "  {:<24}{:>8}\n",
        "Actuarial Adjustment",
        composition.actuarial.to_string()
    ));
    output.push_str(&format!("  {}\n", "-".repeat(32)));
    output.push_str(&format!(
        "  {:<24}{:>8}\n",
        "Final Score",
        format!("{} / 100", composition.final_score)
    ));
    if composition.capped {
        output.push_str("  Capped at 100\n");
    }

    let mitigations: Vec<_> = record
        .signals()
        .iter()
        .filter(|s| s.is_mitigation())
        .collect();
    if !mitigations.is_empty() {
        output.push_str("\nPositive Signals\n");
        for s in mitigations {
            output.push_str(&format!(
                "  + {}  -{}\n",
                sanitize_terminal(&strip_pts(s.description.as_deref().unwrap_or(""))),
                s.points_saved.unwrap_or(0),
            ));
        }
    }
    output.push_str(RULE);
}

impl DashboardFormatter {
    fn findings_panel(&self, output: &mut String, analysis: &Analysis<'_>) {
        let record = analysis.record;
        output.push_str("RISK FINDINGS\n");

        let findings = record.findings();
        if findings.is_empty() {
            output.push_str("  No significant risk factors detected.\n");
        } else {
            let mut regular: Vec<&Finding> = findings.iter().filter(|f| !f.is_multiplier()).collect();
            // Stable sort keeps source order among equal scores.
            regular.sort_by(|a, b| b.score.cmp(&a.score));
            for f in regular {
                self.finding_line(output, f, false);
            }
            for f in findings.iter().filter(|f| f.is_multiplier()) {
                self.finding_line(output, f, true);
            }
        }

        if let Some(ref narrative) = record.narrative {
            output.push_str("\nTIME MACHINE POST-MORTEM\n");
            output.push_str(&format!(
                "  {}\n",
                sanitize_terminal(&narrative.breakdown.vulnerability)
            ));
            for section in &narrative.sections {
                output.push_str(&format!("\n  {}\n", sanitize_terminal(&section.title)));
                output.push_str(&format!("    {}\n", sanitize_terminal(&section.text)));
            }
            output.push_str("\n  Attack Steps\n");
            for (i, step) in split_attack_steps(&narrative.breakdown.steps)
                .iter()
                .enumerate()
            {
                output.push_str(&format!("    {}. {}\n", i + 1, sanitize_terminal(step)));
            }
        }
        output.push_str(RULE);
    }

    fn finding_line(&self, output: &mut String, finding: &Finding, multiplier: bool) {
        let marker = if multiplier {
            "x".to_string()
        } else {
            match RiskBand::from_score(finding.score) {
                RiskBand::High => "!!".to_string(),
                RiskBand::Medium => "!".to_string(),
                RiskBand::Low => ".".to_string(),
            }
        };
        output.push_str(&format!(
            "  {marker:<3}{:<60}{:>4} pts\n",
            sanitize_terminal(&finding.description),
            finding.score,
        ));
        if self.show_guidance
            && let Some((investor, developer)) = finding.guidance()
        {
            output.push_str(&format!("       Investors:  {}\n", sanitize_terminal(investor)));
            if !developer.is_empty() {
                output.push_str(&format!("       Developers: {}\n", sanitize_terminal(developer)));
            }
        }
    }
}

fn intel_panel(output: &mut String, analysis: &Analysis<'_>) {
    let record = analysis.record;
    let scan = &record.scan_result;

    output.push_str("EXPLOIT INTELLIGENCE\n");
    let rows = [
        ("Attack Vector", format_vector(&record.meta.attack_vector)),
        ("Total Loss", format_loss(record.meta.loss_amount_usd)),
        ("Exploit Date", sanitize_terminal(&format_date(&record.meta.date))),
        ("Chain", sanitize_terminal(&record.chain_display_name)),
    ];
    for (label, value) in rows {
        output.push_str(&format!("  {label:<14}{value}\n"));
    }

    output.push_str("\nCONTRACT INTELLIGENCE\n");
    let rows = [
        (
            "Archetype",
            sanitize_terminal(record.context_data.archetype.as_deref().unwrap_or("Unknown")),
        ),
        ("Engine", "CIR v2.6".to_string()),
        ("Duration", format!("{:.2}s", scan.scan_duration_seconds)),
        ("Primitives", record.primitive_count.to_string()),
        ("Source", "Cached pre-exploit code".to_string()),
    ];
    for (label, value) in rows {
        output.push_str(&format!("  {label:<14}{value}\n"));
    }

    output.push_str("\nACTUARIAL INTELLIGENCE\n");
    let composition = analysis.composition();
    if composition.actuarial == ActuarialLine::NotApplicable {
        output.push_str(&format!("  {MAX_RISK_NOTE}\n"));
    } else {
        let weight = analysis.weight;
        output.push_str(&format!(
            "  {:<16}{}\n",
            "Base Score", record.actuarial.base
        ));
        output.push_str(&format!(
            "  {:<16}{}\n",
            "Refined Score",
            analysis.current_score()
        ));
        output.push_str(&format!(
            "  {:<16}{}\n",
            "Actuarial Delta",
            composition.actuarial
        ));
        let filled = usize::from(weight.step());
        output.push_str(&format!(
            "  [{}{}] {weight}\n",
            "#".repeat(filled),
            "-".repeat(10 - filled),
        ));
    }

    output.push_str("\nActuarial Methodology\n");
    output.push_str(&format!("  {METHODOLOGY_NOTE}\n"));
    output.push_str(RULE);
}

fn status_bar(output: &mut String, analysis: &Analysis<'_>) {
    let scan = &analysis.record.scan_result;
    output.push_str(&format!(
        "DeRisk CIR v2.6 \u{2014} Time Machine    {} \u{2014} {:.2}s \u{2014} Scan based on pre-exploit source code\n",
        sanitize_terminal(&scan.scan_date),
        scan.scan_duration_seconds,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use timemachine_catalog::RecordStore;
    use timemachine_core::Weight;

    fn render(id: &str, weight: Weight, guidance: bool) -> String {
        let store = RecordStore::bundled().unwrap();
        let record = store.get(id).unwrap();
        DashboardFormatter::new(guidance)
            .format(&Analysis::new(record, weight))
            .unwrap()
    }

    const EMPTY_RECORD: &str = r#"{
        "exploit_meta": {"name": "Quiet Pool", "attack_vector": "logic_error", "loss_amount_usd": 0, "date": "2020-02-02"},
        "chain_display_name": "Polygon",
        "scan_result": {
            "ContractAddress": "0x01",
            "RiskScore": 8,
            "RiskFactors": [],
            "MitigationsAndSignals": [],
            "ScanDate": "2025-08-14 09:00:00",
            "ScanDuration": 0.8
        },
        "composition": {"raw_risk_score": 8, "mitigation_credit": 0, "multiplier_details": []},
        "actuarial": {"base": 6, "pre_actuarial_score": 8, "slider_deltas": [0,0,0,1,1,1,1,2,2,2,2], "full_delta": 2}
    }"#;

    #[test]
    fn sanitize_replaces_control_chars() {
        assert_eq!(sanitize_terminal("a\x1b[31mb\tc\n"), "a?[31mb\tc\n");
    }

    #[test]
    fn dao_headline_and_waterfall() {
        let out = render("dao_2016", Weight::DEFAULT, false);
        assert!(out.starts_with("The DAO"));
        assert!(out.contains("RISK SCORE  68  SMOKING GUN"));
        assert!(out.contains("Actuarial Adjustment"));
        assert!(out.contains("+6"));
        assert!(out.contains("68 / 100"));
        assert!(out.contains("Engine        CIR v2.6"));
        assert!(out.contains("[###-------] 30%"));
    }

    #[test]
    fn regular_findings_sorted_by_score() {
        let out = render("dao_2016", Weight::DEFAULT, false);
        let store = RecordStore::bundled().unwrap();
        let record = store.get("dao_2016").unwrap();
        let mut regular: Vec<&Finding> =
            record.findings().iter().filter(|f| !f.is_multiplier()).collect();
        regular.sort_by(|a, b| b.score.cmp(&a.score));
        let positions: Vec<usize> = regular
            .iter()
            .map(|f| out.find(f.description.as_str()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ceiling_record_shows_max_risk_note() {
        let out = render("beanstalk_2022", Weight::MAX, false);
        assert!(out.contains("Maximum risk score reached (100)"));
        assert!(out.contains("n/a"));
        assert!(!out.contains("Refined Score"));
    }

    #[test]
    fn guidance_only_when_enabled() {
        let with = render("dao_2016", Weight::DEFAULT, true);
        let without = render("dao_2016", Weight::DEFAULT, false);
        assert!(with.contains("Investors:"));
        assert!(!without.contains("Investors:"));
    }

    #[test]
    fn post_mortem_numbers_attack_steps() {
        let out = render("dao_2016", Weight::DEFAULT, false);
        assert!(out.contains("TIME MACHINE POST-MORTEM"));
        assert!(out.contains("    1. "));
    }

    #[test]
    fn exploit_intelligence_rows() {
        let out = render("dao_2016", Weight::DEFAULT, false);
        let start = out.find("EXPLOIT INTELLIGENCE").unwrap();
        let end = out.find("CONTRACT INTELLIGENCE").unwrap();
        let block = &out[start..end];
        assert!(block.contains("Attack Vector Reentrancy"));
        assert!(block.contains("Total Loss    $60M"));
        assert!(block.contains("Exploit Date  2016-06-17"));
        assert!(block.contains("Chain         Ethereum"));
    }

    #[test]
    fn methodology_note_always_shown() {
        for id in ["dao_2016", "beanstalk_2022"] {
            let out = render(id, Weight::DEFAULT, false);
            assert!(out.contains("Actuarial Methodology"));
            assert!(out.contains("1,400+ historical exploit incidents"));
            assert!(out.contains("10% increments"));
        }
    }

    #[test]
    fn zero_findings_show_empty_message() {
        let store = RecordStore::from_documents([("quiet", EMPTY_RECORD)]).unwrap();
        let record = store.get("quiet").unwrap();
        let out = DashboardFormatter::default()
            .format(&Analysis::new(record, Weight::DEFAULT))
            .unwrap();
        let findings = &out[out.find("RISK FINDINGS").unwrap()..];
        assert!(findings.starts_with("RISK FINDINGS\n  No significant risk factors detected.\n"));
        assert!(!out.contains("TIME MACHINE POST-MORTEM"));
        assert!(out.contains("Total Loss    Unknown"));
    }
}
