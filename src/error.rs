use thiserror::Error;

/// Failures at the crate's I/O edges.
///
/// Routing and layout never fail; only reading configuration and flow
/// documents can.
#[derive(Debug, Error)]
pub enum FlowboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Json5(#[from] json5::Error),
}

pub type Result<T> = std::result::Result<T, FlowboardError>;
