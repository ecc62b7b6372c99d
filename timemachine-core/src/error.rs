#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuarialError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
