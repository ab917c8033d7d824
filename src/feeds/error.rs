use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(String),
    #[error("format error: {0}")]
    Format(String),
    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),
}
