//! Error types for the stock price agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Workflow Errors
    // =============================

    /// Malformed graph state or a failed pattern lookup during resolution.
    /// Absorbed at the orchestrator boundary into an `ERROR` status; the
    /// original cause is kept in the message for diagnostics.
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// The knowledge base has no locale-tagged ticker for the entity.
    /// A data-coverage gap, not an infrastructure fault.
    #[error("No ticker known: {0}")]
    NoTickerKnown(String),

    /// The market data source answered, but the payload did not carry
    /// the expected quote shape.
    #[error("Malformed quote response: {0}")]
    MalformedQuote(String),

    /// A required well-known symbol is missing from the registry.
    /// Indicates a broken deployment; never absorbed into a status.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}
