//! Privacy Shield error types

use thiserror::Error;

/// Privacy Shield error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redaction pattern error
    #[error("Privacy error: {0}")]
    Privacy(String),

    /// Requested rule set is not registered
    #[error("Invalid compliance type: {0}")]
    InvalidComplianceType(String),

    /// Compliance payload could not be evaluated
    #[error("Compliance error: {0}")]
    Compliance(String),

    /// Cryptographic error
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than a
    /// processing failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidComplianceType(_))
    }
}

/// Result type alias for Privacy Shield operations
pub type Result<T> = std::result::Result<T, Error>;
