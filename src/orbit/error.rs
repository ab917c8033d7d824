use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrbitError {
    #[error("invalid mean elements: {0}")]
    Elements(String),
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("no orbit available for {0}")]
    Missing(String),
}
