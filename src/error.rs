use thiserror::Error;

/// Errors raised by a recognition engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine not available: {0}")]
    NotAvailable(String),

    #[error("Recognition failed: {0}")]
    Failed(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Recognition timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid engine output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Faults that abort a pipeline run.
///
/// None of these escape the orchestrator; they are flattened into the
/// `error` field of an `ExtractionResult`. A grammar that finds nothing is
/// not an error and has no variant here.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error(transparent)]
    Recognition(#[from] EngineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration load/save failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,

    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rejections from the batch entry points.
#[derive(Debug, Error, PartialEq)]
pub enum BatchError {
    #[error("Maximum {max} screenshots allowed per batch, got {got}")]
    TooMany { max: usize, got: usize },
}
