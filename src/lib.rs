//! # winrm-keywords
//!
//! Test-automation keywords for running commands on Windows hosts over WinRM.
//!
//! The crate keeps a registry of named sessions and exposes four keywords
//! on top of it: `Create Session`, `Run Cmd`, `Run Ps` and
//! `Delete All Sessions`. Keywords can be called directly from Rust or
//! through the JSON keyword server in [`api`].
//!
//! ## Features
//!
//! - **Session registry**: Alias and index lookup with a current-session slot
//! - **WS-Management client**: Remote shell lifecycle over HTTP or HTTPS
//! - **PowerShell**: Encoded scripts with CLIXML error cleanup
//! - **Keyword server**: Name-based dispatch over a small HTTP API
//!
//! ## Quick Start
//!
//! ```no_run
//! use winrm_keywords::{WinRmConfig, WinRmLibrary};
//!
//! #[tokio::main]
//! async fn main() -> winrm_keywords::Result<()> {
//!     // Initialize logging
//!     winrm_keywords::logging::try_init().ok();
//!
//!     let library = WinRmLibrary::with_config(WinRmConfig::default())?;
//!     library.create_session("server", "windows-host", "Administrator", "secret")?;
//!
//!     let result = library.run_cmd("server", "ipconfig", Some(&["/all".to_string()])).await?;
//!     println!("{} {}", result.status_code, result.std_out);
//!
//!     library.delete_all_sessions()?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod keywords;
pub mod logging;
pub mod registry;
pub mod winrm;

// Re-export commonly used types
pub use client::{CommandOutput, Connector, Credentials, RemoteSession};
pub use error::{Result, WinRmError};
pub use keywords::WinRmLibrary;
pub use registry::SessionRegistry;
pub use winrm::{Transport, WinRmConfig, WinRmConnector};
