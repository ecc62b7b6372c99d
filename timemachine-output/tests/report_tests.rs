//! Report rendering against the bundled catalogue.

use std::cell::RefCell;

use timemachine_catalog::RecordStore;
use timemachine_core::{Analysis, Weight};
use timemachine_output::{
    AnalysisFormatter, HtmlReport, OutputError, Presenter, ReportGenerator,
};

fn store() -> RecordStore {
    RecordStore::bundled().unwrap()
}

fn render(store: &RecordStore, id: &str, weight: Weight) -> String {
    let record = store.get(id).unwrap();
    HtmlReport.format(&Analysis::new(record, weight)).unwrap()
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("missing {needle:?}"))
}

#[derive(Default)]
struct Capture(RefCell<Vec<String>>);

impl Presenter for Capture {
    fn present(&self, document: &str) -> Result<(), OutputError> {
        self.0.borrow_mut().push(document.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "capture".into()
    }
}

struct Offline;

impl Presenter for Offline {
    fn present(&self, _document: &str) -> Result<(), OutputError> {
        Err(OutputError::PresentationFailure("print dialog unavailable".into()))
    }

    fn describe(&self) -> String {
        "offline".into()
    }
}

#[test]
fn report_is_byte_identical_across_calls() {
    let store = store();
    for id in store.list() {
        for weight in Weight::all() {
            assert_eq!(render(&store, id, weight), render(&store, id, weight));
        }
    }
}

#[test]
fn report_is_self_contained_document() {
    let store = store();
    let html = render(&store, "dao_2016", Weight::DEFAULT);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>The DAO — Risk Analysis Report</title>"));
    assert!(html.contains("<style>"));
    assert!(html.contains("window.print()"));
    assert!(html.contains("Scan based on pre-exploit source code"));
    assert!(html.trim_end().ends_with("</html>"));
}

#[test]
fn legend_lists_three_bands() {
    let store = store();
    let html = render(&store, "euler_2023", Weight::DEFAULT);
    let safe = position(&html, "0-25");
    let caution = position(&html, "26-65");
    let high = position(&html, "66-100");
    assert!(safe < caution && caution < high);
    assert!(html.contains(">Safe<"));
    assert!(html.contains(">Caution<"));
    assert!(html.contains(">High Risk<"));
}

#[test]
fn score_and_category_follow_weight() {
    let store = store();
    let html = render(&store, "dao_2016", Weight::DEFAULT);
    assert!(html.contains("risk-category-high\">68<"));
    assert!(html.contains("Base 41 \u{2192} Refined 68 (+6 at w = 30%)"));
    assert!(html.contains("Full-intensity equivalent: 41 \u{2192} 61 (+20)."));
    assert!(html.contains("Actuarial analysis: Base 41 | Refined 68 | 30% uplift weighting"));
    assert!(html.contains("Actuarial weight 30%"));
}

#[test]
fn full_weight_omits_full_intensity_sentence() {
    let store = store();
    let html = render(&store, "dao_2016", Weight::MAX);
    assert!(html.contains("at w = 100%"));
    assert!(!html.contains("Full-intensity equivalent"));
}

#[test]
fn ceiling_methodology_regardless_of_weight() {
    let store = store();
    for weight in Weight::all() {
        let html = render(&store, "beanstalk_2022", weight);
        assert!(html.contains("Contract reached maximum risk score (100). Actuarial amplification was not applied"));
        assert!(!html.contains("Actuarial Model v2.1"));
        assert!(html.contains("actuarial amplification not applied"));
    }
}

#[test]
fn regular_findings_precede_multipliers() {
    let store = store();
    let html = render(&store, "dao_2016", Weight::DEFAULT);
    let regular = position(&html, "External call before state update");
    let multiplier = position(&html, "Reentrancy Multiplier");
    assert!(regular < multiplier);
    assert!(html.contains("risk-multiplier"));
}

#[test]
fn cluster_findings_render_as_multipliers() {
    let store = store();
    let html = render(&store, "wormhole_2022", Weight::DEFAULT);
    let line_start = position(&html, "Privileged mint path cluster");
    let card = &html[..line_start];
    let card_open = card.rfind("<div class=\"finding-item").unwrap();
    assert!(card[card_open..].contains("risk-multiplier"));
}

#[test]
fn signal_buckets_in_fixed_order() {
    let store = store();
    let html = render(&store, "dao_2016", Weight::DEFAULT);
    let mitigation = position(&html, "Verified-source contract");
    let summary = position(&html, "Mitigations Summary: \u{2212}7 (Verified \u{2212}4, Proposal \u{2212}3)");
    let baseline = position(&html, "Residual baseline for early DAO contracts");
    let advisory = position(&html, "Recursive call risk was publicly disclosed");
    let actuarial = position(&html, "Actuarial analysis: Base");
    let cohort = position(&html, "Cohort: Reentrancy in pooled-deposit contracts");
    assert!(mitigation < summary);
    assert!(summary < baseline);
    assert!(baseline < advisory);
    assert!(advisory < actuarial);
    assert!(actuarial < cohort);
    assert!(html.contains("[-4]"));
    assert!(html.contains("[+2]"));
}

#[test]
fn no_signals_section_without_signals() {
    let docs = [("quiet", QUIET_RECORD)];
    let store = RecordStore::from_documents(docs).unwrap();
    let html = render(&store, "quiet", Weight::DEFAULT);
    assert!(!html.contains("Signals &amp; Intelligence"));
}

#[test]
fn zero_findings_render_explicit_message() {
    let docs = [("quiet", QUIET_RECORD)];
    let store = RecordStore::from_documents(docs).unwrap();
    let html = render(&store, "quiet", Weight::DEFAULT);
    assert!(html.contains("No significant risk factors were identified."));
    assert!(html.contains("Risk Profile"));
}

#[test]
fn record_text_is_escaped() {
    let docs = [("quiet", QUIET_RECORD)];
    let store = RecordStore::from_documents(docs).unwrap();
    let html = render(&store, "quiet", Weight::DEFAULT);
    assert!(html.contains("Vault &lt;v2&gt; &amp; Co"));
    assert!(!html.contains("Vault <v2>"));
}

#[test]
fn generator_presents_document() {
    let store = store();
    let record = store.get("mango_2022").unwrap();
    let analysis = Analysis::new(record, Weight::new(60).unwrap());
    let generator = ReportGenerator::new(Capture::default());

    let delivered = generator.generate(&analysis).unwrap();
    assert!(delivered.presented());
    assert_eq!(delivered.document, HtmlReport.format(&analysis).unwrap());
}

#[test]
fn generator_survives_presentation_failure() {
    let store = store();
    let record = store.get("euler_2023").unwrap();
    let analysis = Analysis::new(record, Weight::DEFAULT);

    let delivered = ReportGenerator::new(Offline).generate(&analysis).unwrap();
    assert!(!delivered.presented());
    assert!(delivered.document.starts_with("<!DOCTYPE html>"));
}

const QUIET_RECORD: &str = r#"{
    "exploit_meta": {"name": "Vault <v2> & Co", "attack_vector": "access_control", "loss_amount_usd": 0, "date": "2021-03-01"},
    "chain_display_name": "Arbitrum",
    "scan_result": {
        "ContractAddress": "0xabcdef0123456789abcdef0123456789abcdef01",
        "RiskScore": 12,
        "RiskFactors": [],
        "MitigationsAndSignals": [],
        "ScanDate": "2025-08-14 09:00:00",
        "ScanDuration": 1.5
    },
    "composition": {"raw_risk_score": 12, "mitigation_credit": 0, "multiplier_details": []},
    "actuarial": {"base": 10, "pre_actuarial_score": 12, "slider_deltas": [0,0,0,1,1,1,2,2,2,3,3], "full_delta": 3}
}"#;
