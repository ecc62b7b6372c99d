use std::fmt::Write;

use timemachine_core::{Analysis, RiskBand};
use timemachine_types::{ACTUARIAL_ANALYSIS_KEY, Finding, Signal, SignalKind};

use crate::present::{Delivered, Presenter, deliver};
use crate::traits::{AnalysisFormatter, OutputError};

/// Self-contained printable HTML risk report with inline CSS and a
/// print-on-load hook.
///
/// Output depends only on the analysis: no clock, no randomness, so the same
/// input always produces the same bytes.
pub struct HtmlReport;

impl AnalysisFormatter for HtmlReport {
    fn format(&self, analysis: &Analysis<'_>) -> Result<String, OutputError> {
        let mut out = String::with_capacity(24_576);
        write_report(&mut out, analysis).map_err(|e| OutputError::FormatError(e.to_string()))?;
        Ok(out)
    }
}

/// Builds the report and hands it to a presenter.
pub struct ReportGenerator<P> {
    presenter: P,
}

impl<P: Presenter> ReportGenerator<P> {
    pub fn new(presenter: P) -> Self {
        Self { presenter }
    }

    /// Render and present. A presentation failure is logged and recorded on
    /// the result; the document is returned either way.
    pub fn generate(&self, analysis: &Analysis<'_>) -> Result<Delivered, OutputError> {
        let document = HtmlReport.format(analysis)?;
        Ok(deliver(document, &self.presenter))
    }
}

const FONT_URL: &str = "https://api.fontshare.com/v2/css?f[]=satoshi@300,400,500,700&amp;f[]=space-grotesk@400,500,600,700&amp;display=swap";

const DISCLAIMER: &str = "Automated heuristic output. Use only as one input in your own \
    due-diligence process. No investment, legal, or tax advice provided.";

const MAX_RISK_METHODOLOGY: &str = "Contract reached maximum risk score (100). Actuarial \
    amplification was not applied as the base heuristic analysis already indicates maximum \
    risk. Loss-risk index scaled 0-100 (0 = no recorded loss, 100 = all similar contracts \
    exploited). 12-month horizon based on 1,400+ historical incidents.";

const MAX_RISK_SIGNAL: &str =
    "Actuarial analysis: Contract reached maximum risk (100) — actuarial amplification not applied";

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn signed(n: i32) -> String {
    if n >= 0 { format!("+{n}") } else { n.to_string() }
}

/// `0x1234...cdef` style abbreviation.
fn short_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

/// Methodology sentence for the footer. Fixed wording when the record is
/// already at maximum risk; otherwise the dataset-versioned computation.
fn methodology(analysis: &Analysis<'_>) -> String {
    if analysis.at_max_risk() {
        return MAX_RISK_METHODOLOGY.to_string();
    }
    let actuarial = &analysis.record.actuarial;
    let weight = analysis.weight.percent();
    let mut text = format!(
        "Actuarial Model v2.1 (dataset as-of 2025-08-01). 12-month horizon; 1,400+ incidents. \
         Scale: loss-risk index 0\u{2013}100 (0 = no recorded loss, 100 = all similar contracts \
         exploited). Current: Base {} \u{2192} Refined {} ({} at w = {weight}%).",
        actuarial.base,
        analysis.current_score(),
        signed(analysis.delta()),
    );
    if weight < 100 {
        let full_refined = actuarial.base.saturating_add(actuarial.full_delta).min(100);
        text.push_str(&format!(
            " Full-intensity equivalent: {} \u{2192} {full_refined} ({}).",
            actuarial.base,
            signed(actuarial.full_delta),
        ));
    }
    text.push_str(" Rounded at end; fractional deltas &lt;1 display as 0.");
    text
}

fn actuarial_signal_text(signal: &Signal, analysis: &Analysis<'_>) -> String {
    if !signal.has_key(ACTUARIAL_ANALYSIS_KEY) {
        return format!(
            "{}: {}",
            signal.name.as_deref().unwrap_or(""),
            signal.value.as_deref().unwrap_or(""),
        );
    }
    if analysis.at_max_risk() {
        return MAX_RISK_SIGNAL.to_string();
    }
    let base = analysis.record.actuarial.base;
    let score = analysis.current_score();
    let mut text = format!(
        "{}: Base {base} | Refined {score} | {}% uplift weighting",
        signal.name.as_deref().unwrap_or("Actuarial analysis"),
        analysis.weight.percent(),
    );
    if score >= 100 && base < 100 {
        text.push_str(" (maximum reached)");
    }
    text
}

/// First word of a description, cut at the first hyphen: `Bug-bounty programme` -> `Bug`.
fn short_label(description: &str) -> &str {
    let word = description.split(' ').next().unwrap_or("");
    word.split('-').next().unwrap_or("")
}

// ---------------------------------------------------------------------------
// report builder
// ---------------------------------------------------------------------------

fn write_report(out: &mut String, analysis: &Analysis<'_>) -> std::fmt::Result {
    let record = analysis.record;
    let scan = &record.scan_result;
    let band = analysis.band();

    // --- HTML head ---
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    writeln!(
        out,
        "<title>{} — Risk Analysis Report</title>",
        html_escape(&record.meta.name)
    )?;
    writeln!(out, "<link href=\"{FONT_URL}\" rel=\"stylesheet\">")?;
    write_css(out)?;
    out.push_str("</head>\n<body>\n<div class=\"report-container\">\n");

    // --- Header ---
    out.push_str("<header class=\"report-header\">\n<div class=\"header-info\">\n");
    writeln!(out, "<h1>{}</h1>", html_escape(&record.meta.name))?;
    writeln!(
        out,
        "<p><span class=\"info-label\">Contract Address:</span> {}</p>",
        html_escape(&scan.contract_address)
    )?;
    writeln!(
        out,
        "<p><span class=\"info-label\">Chain:</span> {}</p>",
        html_escape(&record.chain_display_name)
    )?;
    writeln!(
        out,
        "<p><span class=\"info-label\">Scan Time:</span> {} <span class=\"info-label\">|</span> {:.2} seconds</p>",
        html_escape(&scan.scan_date),
        scan.scan_duration_seconds,
    )?;
    out.push_str("<p class=\"scan-note\">Scan based on pre-exploit source code</p>\n");
    out.push_str("</div>\n<div class=\"risk-score-section\">\n");
    writeln!(
        out,
        "<span class=\"risk-score-value risk-category-{}\">{}</span>",
        band.css_class(),
        analysis.current_score(),
    )?;
    writeln!(
        out,
        "<span class=\"risk-score-label\">{}</span>",
        band.report_label()
    )?;
    out.push_str("</div>\n</header>\n");

    write_legend(out)?;

    // --- Findings ---
    out.push_str("<section class=\"section\">\n<h2 class=\"section-title\">Risk Profile</h2>\n");
    let findings = record.findings();
    if findings.is_empty() {
        out.push_str(
            "<div class=\"finding-item\"><p>&#10003; No significant risk factors were identified.</p></div>\n",
        );
    } else {
        for f in findings.iter().filter(|f| !f.is_multiplier()) {
            write_finding(out, f, false)?;
        }
        for f in findings.iter().filter(|f| f.is_multiplier()) {
            write_finding(out, f, true)?;
        }
    }
    out.push_str("</section>\n");

    // --- Signals ---
    if !record.signals().is_empty() {
        out.push_str(
            "<section class=\"section\">\n<h2 class=\"section-title\">Signals &amp; Intelligence</h2>\n",
        );
        write_signals(out, analysis)?;
        out.push_str("</section>\n");
    }

    // --- Footer ---
    out.push_str("<footer class=\"report-footer\">\n");
    out.push_str("<span class=\"headline\">DeRisk DeFi Risk Intelligence Platform</span>\n");
    writeln!(out, "<span class=\"disclaimer\">{DISCLAIMER}</span>")?;
    writeln!(out, "<span class=\"methodology\">{}</span>", methodology(analysis))?;
    writeln!(
        out,
        "<div class=\"evidence-strip\"><strong>Evidence:</strong> Chain = {} | Address {} | Scan {} | Actuarial weight {}%</div>",
        html_escape(&record.chain_display_name),
        html_escape(&short_address(&scan.contract_address)),
        html_escape(&scan.scan_date),
        analysis.weight.percent(),
    )?;
    out.push_str("</footer>\n</div>\n");

    // --- Print hook ---
    out.push_str("<script>\nwindow.onload = function() { window.print(); };\n</script>\n");
    out.push_str("</body>\n</html>\n");
    Ok(())
}

fn write_legend(out: &mut String) -> std::fmt::Result {
    out.push_str("<section class=\"scoring-guide-section\">\n");
    out.push_str("<h3 class=\"scoring-guide-title\">Risk Scoring Guide</h3>\n");
    out.push_str("<div class=\"score-ranges\">\n");
    let ranges = [
        ("range-safe", "0-25", RiskBand::Low, "Low risk protocols"),
        ("range-caution", "26-65", RiskBand::Medium, "Moderate risk factors present"),
        ("range-high", "66-100", RiskBand::High, "Significant concerns identified"),
    ];
    for (class, span, band, blurb) in ranges {
        writeln!(
            out,
            "<div class=\"score-range {class}\"><span class=\"range-number\">{span}</span>\
             <span class=\"range-label\">{}</span><span class=\"range-description\">{blurb}</span></div>",
            band.description(),
        )?;
    }
    out.push_str("</div>\n</section>\n");
    Ok(())
}

fn write_finding(out: &mut String, finding: &Finding, multiplier: bool) -> std::fmt::Result {
    let cat = RiskBand::from_score(finding.score).css_class();
    let (item_class, tag_class) = if multiplier {
        (" risk-multiplier".to_string(), "tag-multiplier".to_string())
    } else {
        (String::new(), format!("tag-{cat}"))
    };

    writeln!(out, "<div class=\"finding-item risk-border-{cat}{item_class}\">")?;
    writeln!(
        out,
        "<div class=\"finding-header\"><span class=\"finding-title\">{}</span>\
         <span class=\"risk-tag {tag_class}\">{} pts</span></div>",
        html_escape(&finding.description),
        finding.score,
    )?;
    if let Some((investor, developer)) = finding.guidance() {
        writeln!(
            out,
            "<div class=\"explanation-content\">\
             <h5>For Investors / Risk Analysts:</h5><p>{}</p>\
             <h5>For Developers / Protocol Teams:</h5><p>{}</p></div>",
            html_escape(investor),
            html_escape(developer),
        )?;
    }
    out.push_str("</div>\n");
    Ok(())
}

fn write_signal_card(
    out: &mut String,
    class: &str,
    icon: &str,
    text: &str,
    badge: Option<String>,
) -> std::fmt::Result {
    write!(
        out,
        "<div class=\"signal-card {class}\"><div class=\"signal-icon\">{icon}</div>\
         <div class=\"signal-description\"><span class=\"signal-text\"><strong>{}</strong></span>",
        html_escape(text),
    )?;
    if let Some(badge) = badge {
        write!(out, "<span class=\"miti-badge\">{badge}</span>")?;
    }
    out.push_str("</div></div>\n");
    Ok(())
}

/// Signals in fixed order: mitigations, mitigation summary, residual baseline,
/// advisories, actuarial intelligence.
fn write_signals(out: &mut String, analysis: &Analysis<'_>) -> std::fmt::Result {
    let signals = analysis.record.signals();
    let mitigations: Vec<&Signal> = signals.iter().filter(|s| s.is_mitigation()).collect();
    let saved = |s: &Signal| s.points_saved.filter(|&p| p > 0);

    for &s in &mitigations {
        write_signal_card(
            out,
            "positive-signal",
            "&#10003;",
            s.description.as_deref().unwrap_or(""),
            saved(s).map(|p| format!("[-{p}]")),
        )?;
    }

    let total_saved: u32 = mitigations.iter().filter_map(|&s| saved(s)).sum();
    if total_saved > 0 {
        let details = mitigations
            .iter()
            .filter_map(|&s| {
                saved(s).map(|p| {
                    format!(
                        "{} \u{2212}{p}",
                        short_label(s.description.as_deref().unwrap_or(""))
                    )
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        write_signal_card(
            out,
            "positive-signal",
            "&#10003;",
            &format!("Mitigations Summary: \u{2212}{total_saved} ({details})"),
            None,
        )?;
    }

    for s in signals.iter().filter(|s| s.is_residual_baseline()) {
        write_signal_card(
            out,
            "positive-signal",
            "&#10003;",
            s.description.as_deref().unwrap_or(""),
            saved(s).map(|p| format!("[+{p}]")),
        )?;
    }

    for s in signals.iter().filter(|s| s.kind == SignalKind::AdvisorySignal) {
        write_signal_card(
            out,
            "advisory-signal",
            "!",
            s.description.as_deref().unwrap_or(""),
            None,
        )?;
    }

    for s in signals
        .iter()
        .filter(|s| s.kind == SignalKind::ActuarialIntelligence)
    {
        write_signal_card(
            out,
            "actuarial-intelligence",
            "&#9679;",
            &actuarial_signal_text(s, analysis),
            None,
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// inline CSS
// ---------------------------------------------------------------------------

fn write_css(out: &mut String) -> std::fmt::Result {
    out.push_str("<style>\n");
    out.push_str(
        ":root{--bg:#ffffff;--panel:#f8f9fa;--action:#4f8fe6;--text:#1a1a1a;--muted:#6b7280;\
         --border:#e5e7eb;--high:#a10b2b;--medium:#ff8c00;--low:#6ea900;--multi:#1b3644;\
         --heading:'Space Grotesk',sans-serif;--body:'Satoshi',sans-serif;--radius:8px}\n\
         *{box-sizing:border-box;margin:0;padding:0}\n\
         body{font-family:var(--body);font-size:12px;line-height:1.4;color:var(--text);background:var(--bg)}\n\
         .report-container{max-width:800px;margin:0 auto;padding:20px}\n\
         .report-header{border-bottom:2px solid var(--border);padding-bottom:20px;margin-bottom:30px;display:flex;justify-content:space-between;align-items:center}\n\
         .header-info h1{font-family:var(--heading);font-size:24px;font-weight:700;color:#1e3a8a;margin-bottom:5px}\n\
         .header-info p{font-family:monospace;color:var(--muted);font-size:10px}\n\
         .header-info .scan-note{font-size:9px;color:#9ca3af;margin-top:4px}\n\
         .info-label{color:var(--action);font-weight:500}\n\
         .risk-score-section{text-align:center}\n\
         .risk-score-value{font-family:var(--heading);font-size:36px;font-weight:700;line-height:1}\n\
         .risk-category-high{color:var(--high)}\n\
         .risk-category-medium{color:var(--medium)}\n\
         .risk-category-low{color:var(--low)}\n\
         .risk-score-label{display:block;font-size:11px;color:var(--muted);margin-top:5px}\n\
         .section{margin-bottom:30px;page-break-inside:avoid}\n\
         .section-title{font-family:var(--heading);font-size:16px;font-weight:600;color:#1e3a8a;margin-bottom:15px;border-bottom:1px solid var(--border);padding-bottom:5px}\n\
         .finding-item{background:var(--panel);border-radius:var(--radius);border-left:4px solid;margin-bottom:15px;padding:15px;page-break-inside:avoid}\n\
         .risk-border-high{border-left-color:var(--high)}\n\
         .risk-border-medium{border-left-color:var(--medium)}\n\
         .risk-border-low{border-left-color:var(--low)}\n\
         .finding-item.risk-multiplier{border-left-color:var(--multi);background:rgba(27,54,68,.08);margin-top:20px}\n\
         .risk-multiplier .finding-title{color:var(--multi);font-weight:600}\n\
         .finding-header{display:flex;justify-content:space-between;align-items:center;margin-bottom:10px}\n\
         .finding-title{font-family:var(--heading);font-size:12px;font-weight:500;flex:1}\n\
         .risk-tag{border-radius:4px;font-family:var(--heading);font-size:10px;font-weight:600;padding:3px 8px;white-space:nowrap}\n\
         .tag-high{background:rgba(161,11,43,.15);color:var(--high)}\n\
         .tag-medium{background:rgba(255,140,0,.15);color:var(--medium)}\n\
         .tag-low{background:rgba(110,169,0,.1);color:var(--low)}\n\
         .tag-multiplier{background:rgba(27,54,68,.15);color:var(--multi)}\n\
         .explanation-content h5{font-size:10px;font-weight:600;color:var(--action);text-transform:uppercase;letter-spacing:.5px;margin:12px 0 5px}\n\
         .explanation-content p{font-size:11px;line-height:1.5;color:var(--muted)}\n\
         .signal-card{background:var(--panel);border:1px solid var(--border);border-radius:var(--radius);padding:10px;margin-bottom:8px;display:flex;align-items:flex-start;gap:8px}\n\
         .positive-signal{border-left:4px solid var(--low)}\n\
         .actuarial-intelligence{border-left:4px solid #a6e6db}\n\
         .advisory-signal{border-left:4px solid #f59e0b}\n\
         .signal-icon{font-size:10px;margin-top:2px}\n\
         .signal-description{flex:1;font-size:11px;display:flex;justify-content:space-between;align-items:center}\n\
         .signal-description strong{font-weight:500;margin-right:.4rem;font-size:.9rem}\n\
         .miti-badge{font-size:.7rem;font-weight:600;color:#4a90a4;margin-left:.25rem;font-family:var(--heading)}\n\
         .scoring-guide-section{margin-bottom:25px;padding:15px;background:var(--panel);border-radius:var(--radius);border:1px solid var(--border)}\n\
         .scoring-guide-title{font-family:var(--heading);font-size:14px;font-weight:600;color:#1e3a8a;margin-bottom:12px;text-align:center}\n\
         .score-ranges{display:flex;justify-content:space-between;gap:15px}\n\
         .score-range{flex:1;text-align:center;padding:8px;border-radius:6px;border:1px solid}\n\
         .range-safe{background:rgba(110,169,0,.1);border-color:var(--low)}\n\
         .range-caution{background:rgba(255,140,0,.1);border-color:var(--medium)}\n\
         .range-high{background:rgba(161,11,43,.1);border-color:var(--high)}\n\
         .range-number{display:block;font-family:var(--heading);font-size:14px;font-weight:700;margin-bottom:2px}\n\
         .range-safe .range-number{color:var(--low)}\n\
         .range-caution .range-number{color:var(--medium)}\n\
         .range-high .range-number{color:var(--high)}\n\
         .range-label{display:block;font-family:var(--heading);font-size:11px;font-weight:600;margin-bottom:3px}\n\
         .range-description{display:block;font-size:9px;color:var(--muted);line-height:1.3}\n\
         .report-footer{margin-top:40px;padding-top:20px;border-top:1px solid var(--border);text-align:center;color:var(--muted);font-size:10px}\n\
         .report-footer .headline{font-size:1.18em;font-weight:800;margin-bottom:14px;display:block}\n\
         .report-footer .disclaimer{font-size:1.08em;font-weight:600;color:#7a7f87;margin-bottom:12px;display:block}\n\
         .report-footer .methodology{font-size:1.08em;color:#7a7f87;display:block}\n\
         .evidence-strip{margin-top:16px;padding-top:12px;border-top:1px solid var(--border);font-size:.9em;color:#9ca3af}\n\
         @media print{body{font-size:11px}.report-container{padding:0}.section{page-break-inside:auto;break-inside:auto}.section-title{break-after:avoid-page}}\n",
    );
    out.push_str("</style>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn signed_numbers() {
        assert_eq!(signed(6), "+6");
        assert_eq!(signed(0), "+0");
        assert_eq!(signed(-4), "-4");
    }

    #[test]
    fn address_abbreviation() {
        assert_eq!(
            short_address("0xbb9bc244d798123fde783fcc1c72d3bb8c189413"),
            "0xbb9b...9413"
        );
        assert_eq!(short_address("abc"), "abc...abc");
    }

    #[test]
    fn mitigation_labels() {
        assert_eq!(short_label("Bug-bounty programme active (-4 pts)"), "Bug");
        assert_eq!(short_label("Six independent audits"), "Six");
        assert_eq!(short_label(""), "");
    }

    #[test]
    fn full_intensity_refined_capped() {
        let store = timemachine_catalog::RecordStore::bundled().unwrap();
        let mut record = store.get("dao_2016").unwrap().clone();
        record.actuarial.full_delta = i32::MAX;
        let text = methodology(&Analysis::new(&record, timemachine_core::Weight::DEFAULT));
        assert!(text.contains("Full-intensity equivalent: 41 \u{2192} 100 ("));
    }
}
