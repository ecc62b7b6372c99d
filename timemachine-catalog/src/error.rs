#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown exploit record: {0}")]
    NotFound(String),
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
    #[error("failed to parse record {id}: {source}")]
    Json {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate record id: {0}")]
    DuplicateId(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
