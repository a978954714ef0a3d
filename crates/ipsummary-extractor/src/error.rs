//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur while driving a batch
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Gateway/transport failure (fatal to the affected document)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Result store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration problem, detected before any document is processed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure outside the store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Contract-type catalog or settings file failed to parse
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
