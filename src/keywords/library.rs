//! The WinRM keyword library.

use std::sync::Arc;

use tracing::{debug, info};

use crate::client::{CommandOutput, Connector, Credentials, RemoteSession};
use crate::registry::SessionRegistry;
use crate::winrm::{WinRmConfig, WinRmConnector};
use crate::Result;

/// Keyword library for Windows Remote Management.
///
/// One instance is shared by every caller in a test run. Sessions are
/// registered under caller-chosen aliases; each command names the alias
/// it runs against.
pub struct WinRmLibrary {
    connector: Arc<dyn Connector>,
    registry: SessionRegistry<dyn RemoteSession>,
}

impl WinRmLibrary {
    /// Create a library that builds sessions with `connector`.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            registry: SessionRegistry::new(),
        }
    }

    /// Create a library backed by a [`WinRmConnector`].
    pub fn with_config(config: WinRmConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(WinRmConnector::new(config)?)))
    }

    /// Session registry.
    pub fn registry(&self) -> &SessionRegistry<dyn RemoteSession> {
        &self.registry
    }

    /// Create a session with a Windows host and register it under `alias`.
    ///
    /// Only local accounts are supported. The new session becomes current,
    /// replacing any earlier session with the same alias. Returns the
    /// session index.
    pub fn create_session(
        &self,
        alias: &str,
        hostname: &str,
        login: &str,
        password: &str,
    ) -> Result<usize> {
        let credentials = Credentials::new(login, password);
        debug!(alias, hostname, ?credentials, "Connecting");

        let session = self.connector.connect(hostname, credentials)?;
        let index = self.registry.register(session, alias)?;

        debug!(alias, index, "session registered");
        Ok(index)
    }

    /// Execute a command on the host registered under `alias`.
    ///
    /// The output is returned as the host reported it; a non-zero status
    /// code is not an error.
    pub async fn run_cmd(
        &self,
        alias: &str,
        command: &str,
        params: Option<&[String]>,
    ) -> Result<CommandOutput> {
        let log_cmd = match params {
            Some(params) => format!("{} {}", command, params.join(" ")),
            None => command.to_string(),
        };
        info!("Run command on server with alias \"{}\": {}", alias, log_cmd);

        let session = self.registry.switch(alias)?;
        session.run_cmd(command, params.unwrap_or(&[])).await
    }

    /// Run a PowerShell script on the host registered under `alias`.
    pub async fn run_ps(&self, alias: &str, script: &str) -> Result<CommandOutput> {
        info!(
            "Run power shell script on server with alias \"{}\": {}",
            alias, script
        );

        let session = self.registry.switch(alias)?;
        session.run_ps(script).await
    }

    /// Remove all sessions.
    pub fn delete_all_sessions(&self) -> Result<()> {
        let dropped = self.registry.clear_all()?;
        debug!(dropped, "deleted all sessions");
        Ok(())
    }
}
