use thiserror::Error;

/// Failures at the edges of the engine: files, config and platform lookup.
///
/// The aggregation engine itself never fails; malformed input degrades to
/// zeros, `"Unknown"` groups or `NoData` totals.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
