//! WinRM client settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WinRmError;
use crate::Result;

/// Default HTTP read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default WS-Management operation timeout.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Windows code page identifier for UTF-8.
pub const UTF8_CODEPAGE: u32 = 65001;

/// HTTP transport used to reach the WinRM service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// HTTP on port 5985.
    #[default]
    Plaintext,
    /// HTTPS on port 5986.
    Ssl,
}

impl Transport {
    /// Default URL scheme for this transport.
    pub fn scheme(&self) -> &'static str {
        match self {
            Transport::Plaintext => "http",
            Transport::Ssl => "https",
        }
    }

    /// Default port for this transport.
    pub fn default_port(&self) -> u16 {
        match self {
            Transport::Plaintext => 5985,
            Transport::Ssl => 5986,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Plaintext => f.write_str("plaintext"),
            Transport::Ssl => f.write_str("ssl"),
        }
    }
}

impl FromStr for Transport {
    type Err = WinRmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "http" => Ok(Transport::Plaintext),
            "ssl" | "https" => Ok(Transport::Ssl),
            other => Err(WinRmError::InvalidParameter(format!(
                "unknown transport '{other}'"
            ))),
        }
    }
}

/// Settings shared by every session a connector creates.
#[derive(Debug, Clone)]
pub struct WinRmConfig {
    /// Transport used when the target has no explicit scheme.
    pub transport: Transport,
    /// HTTP read timeout; must exceed `operation_timeout`.
    pub read_timeout: Duration,
    /// WS-Management `OperationTimeout` sent with each request.
    pub operation_timeout: Duration,
    /// Console code page for new shells.
    ///
    /// Output streams are decoded as UTF-8, which matches the default 65001.
    pub codepage: u32,
    /// Maximum SOAP envelope size accepted from the server.
    pub max_envelope_size: u32,
    /// Message locale.
    pub locale: String,
    /// Skip TLS certificate verification (ssl transport only).
    pub accept_invalid_certs: bool,
}

impl Default for WinRmConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Plaintext,
            read_timeout: DEFAULT_READ_TIMEOUT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            codepage: UTF8_CODEPAGE,
            max_envelope_size: 153_600,
            locale: "en-US".to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl WinRmConfig {
    /// Set the transport.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Set the read and operation timeouts.
    pub fn with_timeouts(mut self, read: Duration, operation: Duration) -> Self {
        self.read_timeout = read;
        self.operation_timeout = operation;
        self
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.operation_timeout.is_zero() {
            return Err(WinRmError::InvalidParameter(
                "operation timeout must be positive".into(),
            ));
        }
        if self.read_timeout <= self.operation_timeout {
            return Err(WinRmError::InvalidParameter(
                "read timeout must exceed operation timeout".into(),
            ));
        }
        Ok(())
    }

    /// Operation timeout as an ISO 8601 duration (`PT20S`).
    pub fn operation_timeout_iso(&self) -> String {
        format!("PT{}S", self.operation_timeout.as_secs())
    }
}
