//! Command result type.

use serde::{Deserialize, Serialize};

/// Result of a remote command or script.
///
/// Returned verbatim to callers: a non-zero status code is data, not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit code reported by the remote host.
    pub status_code: i64,
    /// Standard output text.
    pub std_out: String,
    /// Standard error text.
    pub std_err: String,
}

impl CommandOutput {
    /// Create a new command output.
    pub fn new(status_code: i64, std_out: impl Into<String>, std_err: impl Into<String>) -> Self {
        Self {
            status_code,
            std_out: std_out.into(),
            std_err: std_err.into(),
        }
    }

    /// Build output from UTF-8 stream bytes.
    ///
    /// Invalid sequences are replaced with U+FFFD.
    pub fn from_bytes(status_code: i64, std_out: &[u8], std_err: &[u8]) -> Self {
        Self {
            status_code,
            std_out: String::from_utf8_lossy(std_out).into_owned(),
            std_err: String::from_utf8_lossy(std_err).into_owned(),
        }
    }
}
