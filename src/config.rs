//! Configuration management for winrm-keywords.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::winrm::{Transport, WinRmConfig};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// WinRM client configuration.
    pub winrm: WinRmSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: crate::api::router::DEFAULT_PORT,
        }
    }
}

/// WinRM client configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WinRmSection {
    /// Transport for targets without an explicit scheme.
    pub transport: Transport,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
    /// WS-Management operation timeout in seconds.
    pub operation_timeout_secs: u64,
    /// Console code page for remote shells.
    pub codepage: u32,
    /// Maximum SOAP envelope size.
    pub max_envelope_size: u32,
    /// Message locale.
    pub locale: String,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for WinRmSection {
    fn default() -> Self {
        let defaults = WinRmConfig::default();
        Self {
            transport: defaults.transport,
            read_timeout_secs: defaults.read_timeout.as_secs(),
            operation_timeout_secs: defaults.operation_timeout.as_secs(),
            codepage: defaults.codepage,
            max_envelope_size: defaults.max_envelope_size,
            locale: defaults.locale,
            accept_invalid_certs: defaults.accept_invalid_certs,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("WINRM_KEYWORDS_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("WINRM_KEYWORDS_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(transport) = std::env::var("WINRM_KEYWORDS_TRANSPORT") {
            if let Ok(transport) = transport.parse() {
                self.winrm.transport = transport;
            }
        }

        if let Ok(level) = std::env::var("WINRM_KEYWORDS_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(transport) = args.transport {
            self.winrm.transport = transport;
        }

        if let Some(secs) = args.read_timeout {
            self.winrm.read_timeout_secs = secs;
        }

        if let Some(secs) = args.operation_timeout {
            self.winrm.operation_timeout_secs = secs;
        }

        if args.insecure {
            self.winrm.accept_invalid_certs = true;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env();

        // Apply CLI argument overrides (highest priority)
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        Ok(ServerConfig::new(host.to_string(), self.server.port))
    }

    /// Convert to the settings used for every WinRM session.
    pub fn to_winrm_config(&self) -> Result<WinRmConfig, ConfigError> {
        let config = WinRmConfig {
            transport: self.winrm.transport,
            read_timeout: Duration::from_secs(self.winrm.read_timeout_secs),
            operation_timeout: Duration::from_secs(self.winrm.operation_timeout_secs),
            codepage: self.winrm.codepage,
            max_envelope_size: self.winrm.max_envelope_size,
            locale: self.winrm.locale.clone(),
            accept_invalid_certs: self.winrm.accept_invalid_certs,
        };

        config
            .validate()
            .map_err(|e| ConfigError::InvalidWinRm(e.to_string()))?;

        Ok(config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// Unusable WinRM settings.
    InvalidWinRm(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::InvalidWinRm(msg) => write!(f, "invalid winrm settings: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
