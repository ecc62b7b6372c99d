// ---------------------------------------------------------------------------
// Display helpers shared by every renderer
// ---------------------------------------------------------------------------

use std::sync::LazyLock;

use regex::Regex;

static PTS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(-?\d+\s*pts?\)").expect("static regex"));

static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\)\s*").expect("static regex"));

/// Compact USD loss: `$1.2B`, `$197M`, `$12,345`, or `Unknown` for zero/invalid.
pub fn format_loss(amount: f64) -> String {
    if !amount.is_finite() || amount <= 0.0 {
        return "Unknown".into();
    }
    if amount >= 1_000_000_000.0 {
        return format!("${:.1}B", amount / 1e9);
    }
    if amount >= 1_000_000.0 {
        return format!("${}M", (amount / 1e6).floor() as u64);
    }
    let rounded = (amount * 1000.0).round() / 1000.0;
    let whole = rounded.trunc() as u64;
    let mut out = format!("${}", group_thousands(whole));
    let frac = rounded - rounded.trunc();
    if frac > 0.0 {
        let digits = format!("{frac:.3}");
        let digits = digits.trim_start_matches('0').trim_end_matches('0');
        out.push_str(digits);
    }
    out
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `price_oracle_manipulation` -> `Price Oracle Manipulation`.
pub fn format_vector(vector: &str) -> String {
    let mut out = String::with_capacity(vector.len());
    let mut at_word_start = true;
    for c in vector.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Date part of an ISO-8601 timestamp.
pub fn format_date(date: &str) -> String {
    date.chars().take(10).collect()
}

pub fn format_year(date: &str) -> String {
    date.chars().take(4).collect()
}

/// Remove the first `(N pts)` annotation from a description.
pub fn strip_pts(description: &str) -> String {
    PTS_SUFFIX.replacen(description, 1, "").into_owned()
}

/// Split `"1) Borrow 2) Swap 3) Repay"` into trimmed, non-empty steps.
pub fn split_attack_steps(steps: &str) -> Vec<String> {
    STEP_MARKER
        .split(steps)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_formatting() {
        assert_eq!(format_loss(320_000_000.0), "$320M");
        assert_eq!(format_loss(197_999_999.0), "$197M");
        assert_eq!(format_loss(1_240_000_000.0), "$1.2B");
        assert_eq!(format_loss(12_345.0), "$12,345");
        assert_eq!(format_loss(999.5), "$999.5");
        assert_eq!(format_loss(0.0), "Unknown");
        assert_eq!(format_loss(f64::NAN), "Unknown");
    }

    #[test]
    fn vector_title_case() {
        assert_eq!(format_vector("reentrancy"), "Reentrancy");
        assert_eq!(
            format_vector("flash_loan_governance"),
            "Flash Loan Governance"
        );
        assert_eq!(format_vector("signature-bypass"), "Signature-Bypass");
    }

    #[test]
    fn date_truncation() {
        assert_eq!(format_date("2016-06-17T03:34:48Z"), "2016-06-17");
        assert_eq!(format_year("2016-06-17"), "2016");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn strips_points_annotation() {
        assert_eq!(strip_pts("Timelock present (-8 pts)"), "Timelock present");
        assert_eq!(strip_pts("Audited (12 PT) by firm"), "Audited by firm");
        assert_eq!(strip_pts("No annotation"), "No annotation");
    }

    #[test]
    fn splits_numbered_steps() {
        let steps = split_attack_steps("1) Take flash loan 2) Vote proposal through 3)  Drain");
        assert_eq!(
            steps,
            vec!["Take flash loan", "Vote proposal through", "Drain"]
        );
        assert!(split_attack_steps("").is_empty());
    }
}
