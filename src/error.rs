//! Error types for winrm-keywords.

use thiserror::Error;

/// Main error type for winrm-keywords operations.
#[derive(Error, Debug)]
pub enum WinRmError {
    /// No session is registered under the given alias or index.
    #[error("Non-existing index or alias '{0}'.")]
    SessionNotFound(String),

    /// The current session slot is empty.
    #[error("No sessions created")]
    NoCurrentSession,

    /// The remote host rejected the credentials.
    #[error("the specified credentials were rejected by the server: {0}")]
    InvalidCredentials(String),

    /// Unexpected HTTP response from the remote host.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote host answered with a SOAP fault.
    #[error("WS-Management fault {code} ({}): {reason}", .wsman_code.as_deref().unwrap_or("-"))]
    WsManFault {
        /// SOAP fault code value.
        code: String,
        /// SOAP fault subcode value, if present.
        subcode: Option<String>,
        /// Numeric WSManFault code, if present.
        wsman_code: Option<String>,
        /// Human-readable fault reason.
        reason: String,
    },

    /// A WS-Management operation timed out on the remote side.
    #[error("WS-Management operation timed out")]
    OperationTimeout,

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed or unexpected XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid client parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No keyword matches the given name.
    #[error("no keyword with name '{0}' found")]
    UnknownKeyword(String),

    /// Keyword arguments could not be bound.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl WinRmError {
    /// Whether this error is the expected receive timeout that callers retry.
    pub fn is_operation_timeout(&self) -> bool {
        matches!(self, WinRmError::OperationTimeout)
    }

    /// Whether this error comes from an alias or index lookup.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            WinRmError::SessionNotFound(_) | WinRmError::NoCurrentSession
        )
    }
}

/// Convenience Result type for winrm-keywords operations.
pub type Result<T> = std::result::Result<T, WinRmError>;
