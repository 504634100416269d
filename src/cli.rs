//! Command-line interface for winrm-keywords.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::winrm::Transport;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// WinRM transport for targets without a scheme.
    pub transport: Option<Transport>,
    /// HTTP read timeout in seconds.
    pub read_timeout: Option<u64>,
    /// WS-Management operation timeout in seconds.
    pub operation_timeout: Option<u64>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("transport") => {
                let value: String = parser.value()?.parse()?;
                result.transport = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("transport", value))?,
                );
            }
            Long("read-timeout") => {
                let value: String = parser.value()?.parse()?;
                result.read_timeout = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("read-timeout", value))?,
                );
            }
            Long("operation-timeout") => {
                let value: String = parser.value()?.parse()?;
                result.operation_timeout = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("operation-timeout", value))?,
                );
            }
            Long("insecure") => {
                result.insecure = true;
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"winrm-keywords {version}
Keyword server for running commands on Windows hosts over WinRM

USAGE:
    winrm-keywords [OPTIONS]

OPTIONS:
    -H, --host <ADDR>             Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>             Port to listen on [default: 8270]
    -c, --config <FILE>           Path to configuration file (JSON)
    -l, --log-level <LVL>         Log level (error, warn, info, debug, trace)
    -t, --transport <T>           WinRM transport: plaintext or ssl [default: plaintext]
        --read-timeout <SECS>     HTTP read timeout [default: 30]
        --operation-timeout <SECS>
                                  WS-Management operation timeout [default: 20]
        --insecure                Skip TLS certificate verification
    -h, --help                    Print help
    -V, --version                 Print version

ENVIRONMENT VARIABLES:
    WINRM_KEYWORDS_HOST           Host address (overrides config)
    WINRM_KEYWORDS_PORT           Port number (overrides config)
    WINRM_KEYWORDS_TRANSPORT      WinRM transport (overrides config)
    WINRM_KEYWORDS_LOG_LEVEL      Log level (overrides config)
    RUST_LOG                      Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:8270, plaintext WinRM)
    winrm-keywords

    # Listen on all interfaces, talk HTTPS to the Windows hosts
    winrm-keywords -H 0.0.0.0 -t ssl

    # Start with config file
    winrm-keywords -c /etc/winrm-keywords/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("winrm-keywords {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
