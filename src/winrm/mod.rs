//! WS-Management (WinRM) client.
//!
//! Runs commands through the Windows remote shell over HTTP(S) with Basic
//! authentication. The host must allow Basic auth (and unencrypted traffic
//! for the plaintext transport):
//!
//! ```text
//! winrm set winrm/config/client/auth @{Basic="true"}
//! winrm set winrm/config/service/auth @{Basic="true"}
//! winrm set winrm/config/service @{AllowUnencrypted="true"}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use winrm_keywords::client::{Connector, Credentials};
//! use winrm_keywords::winrm::{WinRmConfig, WinRmConnector};
//!
//! # async fn run() -> winrm_keywords::Result<()> {
//! let connector = WinRmConnector::new(WinRmConfig::default())?;
//! let session = connector.connect("windows-host", Credentials::new("Administrator", "pw"))?;
//! let output = session.run_cmd("ipconfig", &["/all".to_string()]).await?;
//! println!("{}", output.std_out);
//! # Ok(())
//! # }
//! ```

mod config;
mod endpoint;
pub mod powershell;
mod protocol;
mod session;
mod soap;
mod transport;

pub use config::{
    Transport, WinRmConfig, DEFAULT_OPERATION_TIMEOUT, DEFAULT_READ_TIMEOUT, UTF8_CODEPAGE,
};
pub use endpoint::build_url;
pub use protocol::Protocol;
pub use session::{WinRmConnector, WinRmSession};
