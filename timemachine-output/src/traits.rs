use timemachine_core::Analysis;

/// Trait for rendering an analysis into a document.
pub trait AnalysisFormatter: Send + Sync {
    fn format(&self, analysis: &Analysis<'_>) -> Result<String, OutputError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("formatting error: {0}")]
    FormatError(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("presentation failed: {0}")]
    PresentationFailure(String),
}
