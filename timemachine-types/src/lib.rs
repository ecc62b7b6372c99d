pub mod actuarial;
pub mod finding;
pub mod format;
pub mod record;

pub use actuarial::{ActuarialBlock, SLIDER_STEPS, SliderDeltas};
pub use finding::{
    CirExplanation, Finding, FindingKind, Guidance, Signal, SignalKind, RESIDUAL_BASELINE_KEY,
    ACTUARIAL_ANALYSIS_KEY,
};
pub use format::{format_date, format_loss, format_vector, format_year, split_attack_steps, strip_pts};
pub use record::{
    Breakdown, Composition, ContextData, ExploitMeta, ExploitRecord, MultiplierDetail, Narrative,
    NarrativeSection, ScanSummary,
};
