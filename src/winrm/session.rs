//! WinRM sessions and the connector that builds them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::protocol::Protocol;
use super::transport::HttpTransport;
use super::{build_url, powershell, WinRmConfig, UTF8_CODEPAGE};
use crate::client::{CommandOutput, Connector, Credentials, RemoteSession};
use crate::error::WinRmError;
use crate::Result;

/// A session with one Windows host.
///
/// Creating a session does not touch the network or validate the target;
/// every command opens and closes its own remote shell, and a target that
/// cannot form an endpoint URL fails the command.
#[derive(Clone)]
pub struct WinRmSession {
    target: String,
    protocol: std::result::Result<Protocol, String>,
}

impl WinRmSession {
    /// Create a session for `target` using an existing HTTP client.
    pub fn new(
        client: reqwest::Client,
        config: Arc<WinRmConfig>,
        target: &str,
        credentials: Credentials,
    ) -> Self {
        let protocol = build_url(target, config.transport)
            .map(|url| Protocol::new(HttpTransport::new(client, url, credentials), config))
            .map_err(|e| e.to_string());

        Self {
            target: target.to_string(),
            protocol,
        }
    }

    /// Target the session was created for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Endpoint URL, if the target forms one.
    pub fn url(&self) -> Option<&str> {
        self.protocol.as_ref().ok().map(Protocol::url)
    }

    fn endpoint(&self) -> Result<&Protocol> {
        self.protocol
            .as_ref()
            .map_err(|reason| WinRmError::InvalidParameter(reason.clone()))
    }
}

#[async_trait]
impl RemoteSession for WinRmSession {
    async fn run_cmd(&self, command: &str, params: &[String]) -> Result<CommandOutput> {
        self.endpoint()?.run(command, params).await
    }

    async fn run_ps(&self, script: &str) -> Result<CommandOutput> {
        let command = powershell::command_line(script);
        let mut output = self.endpoint()?.run(&command, &[]).await?;
        if !output.std_err.is_empty() {
            output.std_err = powershell::clean_error_msg(&output.std_err);
        }
        Ok(output)
    }
}

/// Builds [`WinRmSession`]s sharing one HTTP client and configuration.
pub struct WinRmConnector {
    client: reqwest::Client,
    config: Arc<WinRmConfig>,
}

impl WinRmConnector {
    /// Create a connector, validating the configuration.
    pub fn new(config: WinRmConfig) -> Result<Self> {
        config.validate()?;

        if config.codepage != UTF8_CODEPAGE {
            warn!(
                codepage = config.codepage,
                "output is decoded as UTF-8; non-ASCII text may be replaced"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(config.read_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Configuration shared by created sessions.
    pub fn config(&self) -> &WinRmConfig {
        &self.config
    }
}

impl Connector for WinRmConnector {
    fn connect(&self, hostname: &str, credentials: Credentials) -> Result<Arc<dyn RemoteSession>> {
        let session = WinRmSession::new(
            self.client.clone(),
            Arc::clone(&self.config),
            hostname,
            credentials,
        );
        match session.url() {
            Some(url) => debug!(url, "created WinRM session"),
            None => debug!(target = session.target(), "created WinRM session with unusable target"),
        }
        Ok(Arc::new(session))
    }
}
