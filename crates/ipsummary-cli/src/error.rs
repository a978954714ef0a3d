//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error(transparent)]
    Extractor(#[from] ipsummary_extractor::ExtractorError),

    /// Result store error
    #[error(transparent)]
    Store(#[from] ipsummary_store::StoreError),

    /// LLM gateway error
    #[error(transparent)]
    Llm(#[from] ipsummary_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced task does not exist
    #[error("Task {0} not found")]
    TaskNotFound(String),
}
