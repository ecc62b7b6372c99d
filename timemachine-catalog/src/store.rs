use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use timemachine_types::{
    ExploitRecord, FindingKind, SLIDER_STEPS, format_loss, format_vector, format_year,
};

use crate::bundled::{BUNDLED_VERSION, bundled_documents};
use crate::error::CatalogError;

/// Read-only catalogue of exploit records keyed by id.
///
/// Records are parsed, validated and classified once at construction and
/// never mutated afterwards; callers only ever receive shared references.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<ExploitRecord>,
    index: HashMap<String, usize>,
}

/// Selector labels for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    /// Home-screen label: `name — loss — vector (year)`.
    pub selector_label: String,
    /// Dashboard drop-down label: `name (score/100)`.
    pub command_label: String,
}

impl RecordStore {
    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        let store = Self::from_documents(bundled_documents())?;
        info!(
            records = store.len(),
            version = BUNDLED_VERSION,
            "loaded bundled exploit catalogue"
        );
        Ok(store)
    }

    /// Load every `*.json` file in `dir`, keyed by file stem, ordered by file name.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut docs = Vec::with_capacity(paths.len());
        for path in &paths {
            let id = path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();
            let content = fs::read_to_string(path).map_err(|e| {
                CatalogError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to read {}: {}", path.display(), e),
                ))
            })?;
            docs.push((id, content));
        }

        let store = Self::from_documents(docs)?;
        info!(
            records = store.len(),
            dir = %dir.display(),
            "loaded exploit catalogue from directory"
        );
        Ok(store)
    }

    /// Build a catalogue from `(id, json)` pairs, preserving their order.
    pub fn from_documents<I, K, V>(docs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut store = Self::default();
        for (id, json) in docs {
            let record = ingest(id.into(), json.as_ref())?;
            if store.index.contains_key(&record.id) {
                return Err(CatalogError::DuplicateId(record.id));
            }
            debug!(
                id = %record.id,
                findings = record.findings().len(),
                signals = record.signals().len(),
                "ingested exploit record"
            );
            store.index.insert(record.id.clone(), store.records.len());
            store.records.push(record);
        }
        Ok(store)
    }

    pub fn get(&self, id: &str) -> Result<&ExploitRecord, CatalogError> {
        self.index
            .get(id)
            .map(|&i| &self.records[i])
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Record ids in catalogue order.
    pub fn list(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExploitRecord> + '_ {
        self.records.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.records
            .iter()
            .map(|r| CatalogEntry {
                id: r.id.clone(),
                selector_label: format!(
                    "{} — {} — {} ({})",
                    r.meta.name,
                    format_loss(r.meta.loss_amount_usd),
                    format_vector(&r.meta.attack_vector),
                    format_year(&r.meta.date),
                ),
                command_label: format!("{} ({}/100)", r.meta.name, r.scan_result.risk_score),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ingestion
// ---------------------------------------------------------------------------

fn ingest(id: String, json: &str) -> Result<ExploitRecord, CatalogError> {
    let mut record: ExploitRecord =
        serde_json::from_str(json).map_err(|source| CatalogError::Json {
            id: id.clone(),
            source,
        })?;
    record.id = id;
    validate(&record)?;

    for finding in &mut record.scan_result.risk_factors {
        if finding.kind.is_none() {
            finding.kind = Some(FindingKind::classify(&finding.description));
        }
    }
    Ok(record)
}

/// Largest actuarial delta magnitude a score on the 0-100 scale can carry.
const MAX_DELTA: i32 = 100;

fn validate(record: &ExploitRecord) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidRecord {
        id: record.id.clone(),
        reason,
    };

    if record.id.is_empty() {
        return Err(invalid("empty record id".into()));
    }
    let bounded = [
        ("scan_result.RiskScore", record.scan_result.risk_score),
        ("composition.raw_risk_score", record.composition.raw_risk_score),
        ("actuarial.base", record.actuarial.base),
        ("actuarial.pre_actuarial_score", record.actuarial.pre_actuarial_score),
    ];
    for (field, value) in bounded {
        if !(0..=100).contains(&value) {
            return Err(invalid(format!("{field} {value} outside 0-100")));
        }
    }
    let loss = record.meta.loss_amount_usd;
    if !loss.is_finite() || loss < 0.0 {
        return Err(invalid(format!("loss_amount_usd {loss} is not a non-negative amount")));
    }
    if record.composition.mitigation_credit < 0 {
        return Err(invalid("composition.mitigation_credit is negative".into()));
    }
    let duration = record.scan_result.scan_duration_seconds;
    if !duration.is_finite() || duration < 0.0 {
        return Err(invalid(format!("ScanDuration {duration} is not a valid duration")));
    }
    if let Some(step) = record
        .actuarial
        .slider_deltas
        .steps()
        .find(|&s| usize::from(s) >= SLIDER_STEPS)
    {
        return Err(invalid(format!("slider step {step} outside 0-10")));
    }
    let actuarial = &record.actuarial;
    let deltas = actuarial
        .slider_deltas
        .steps()
        .map(|s| (format!("slider_deltas[{s}]"), actuarial.slider_deltas.get(s)))
        .chain([("full_delta".to_string(), actuarial.full_delta)]);
    for (field, delta) in deltas {
        if !(-MAX_DELTA..=MAX_DELTA).contains(&delta) {
            return Err(invalid(format!("actuarial.{field} {delta} outside ±{MAX_DELTA}")));
        }
    }
    if let Some(m) = record
        .composition
        .multiplier_details
        .iter()
        .find(|m| !(0..=100).contains(&m.added_points))
    {
        return Err(invalid(format!(
            "multiplier added_points {} outside 0-100",
            m.added_points
        )));
    }
    Ok(())
}
