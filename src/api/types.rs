//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WinRmError;
use crate::keywords::KeywordSpec;
use crate::registry::RegistryEntry;

/// Request to run a keyword.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunKeywordRequest {
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Named arguments.
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// Outcome of a keyword run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeywordStatus {
    Pass,
    Fail,
}

/// Response for a keyword run.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordResult {
    /// PASS or FAIL.
    pub status: KeywordStatus,
    /// Keyword return value (null on failure).
    #[serde(rename = "return")]
    pub return_value: Value,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable failure code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl KeywordResult {
    pub fn pass(return_value: Value) -> Self {
        Self {
            status: KeywordStatus::Pass,
            return_value,
            error: None,
            error_code: None,
        }
    }

    pub fn fail(error: &WinRmError) -> Self {
        Self {
            status: KeywordStatus::Fail,
            return_value: Value::Null,
            error: Some(error.to_string()),
            error_code: Some(error_code(error).to_string()),
        }
    }
}

/// Stable error code for a library error.
pub fn error_code(error: &WinRmError) -> &'static str {
    match error {
        WinRmError::SessionNotFound(_) => "SESSION_NOT_FOUND",
        WinRmError::NoCurrentSession => "NO_SESSION",
        WinRmError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
        WinRmError::Transport(_) | WinRmError::Http(_) => "TRANSPORT_ERROR",
        WinRmError::WsManFault { .. } => "WSMAN_FAULT",
        WinRmError::OperationTimeout => "OPERATION_TIMEOUT",
        WinRmError::Xml(_) => "XML_ERROR",
        WinRmError::InvalidParameter(_) => "INVALID_PARAMETER",
        WinRmError::UnknownKeyword(_) => "KEYWORD_NOT_FOUND",
        WinRmError::InvalidArguments(_) => "INVALID_ARGUMENTS",
        WinRmError::Io(_) | WinRmError::LockPoisoned => "INTERNAL_ERROR",
    }
}

/// Keyword listing response.
#[derive(Debug, Serialize)]
pub struct ListKeywordsResponse {
    /// Number of keywords.
    pub count: usize,
    /// Keyword specifications.
    pub keywords: &'static [KeywordSpec],
}

/// Registered sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    /// Total number of sessions.
    pub count: usize,
    /// Index of the current session.
    pub current: Option<usize>,
    /// Session summaries.
    pub sessions: Vec<SessionSummary>,
}

/// Brief session summary for listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub index: usize,
    pub aliases: Vec<String>,
}

impl From<RegistryEntry> for SessionSummary {
    fn from(entry: RegistryEntry) -> Self {
        Self {
            index: entry.index,
            aliases: entry.aliases,
        }
    }
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "KEYWORD_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn keyword_not_found(name: &str) -> Self {
        Self::new(
            "KEYWORD_NOT_FOUND",
            format!("No keyword with name '{}' found", name),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
