use serde::Serialize;

use timemachine_core::{Analysis, ScoreComposition, Weight};
use timemachine_types::ExploitRecord;

use crate::traits::{AnalysisFormatter, OutputError};

/// Formats an analysis snapshot as pretty-printed JSON: the record plus the
/// derived score at the chosen weight.
pub struct JsonFormatter;

#[derive(Serialize)]
struct Snapshot<'a> {
    id: &'a str,
    name: &'a str,
    weight: Weight,
    current_score: i32,
    delta: i32,
    refined_value: i32,
    composition: ScoreComposition,
    record: &'a ExploitRecord,
}

impl AnalysisFormatter for JsonFormatter {
    fn format(&self, analysis: &Analysis<'_>) -> Result<String, OutputError> {
        let snapshot = Snapshot {
            id: &analysis.record.id,
            name: &analysis.record.meta.name,
            weight: analysis.weight,
            current_score: analysis.adjustment.current_score,
            delta: analysis.adjustment.delta,
            refined_value: analysis.adjustment.refined_value,
            composition: analysis.composition(),
            record: analysis.record,
        };
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| OutputError::FormatError(format!("JSON serialization error: {e}")))
    }
}
