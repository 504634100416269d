//! Remote session abstraction.
//!
//! The keyword layer talks to remote hosts only through these traits:
//! a [`Connector`] builds sessions from a hostname and [`Credentials`],
//! and a [`RemoteSession`] runs commands and scripts, returning a
//! [`CommandOutput`].
//!
//! The bundled implementation is [`crate::winrm::WinRmConnector`].

mod credentials;
mod output;

use std::sync::Arc;

use async_trait::async_trait;

pub use credentials::Credentials;
pub use output::CommandOutput;

use crate::Result;

/// An authenticated handle to a remote host.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Run `command` with the given ordered arguments.
    async fn run_cmd(&self, command: &str, params: &[String]) -> Result<CommandOutput>;

    /// Run a PowerShell script.
    async fn run_ps(&self, script: &str) -> Result<CommandOutput>;
}

/// Builds remote sessions.
///
/// Implementations may connect lazily; connection and authentication
/// failures are then reported by the first command.
pub trait Connector: Send + Sync {
    /// Create a session against `hostname`.
    fn connect(&self, hostname: &str, credentials: Credentials) -> Result<Arc<dyn RemoteSession>>;
}
