//! HTTP transport for SOAP messages.

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use super::soap::{self, XmlNode};
use crate::client::Credentials;
use crate::error::WinRmError;
use crate::Result;

const SOAP_CONTENT_TYPE: &str = "application/soap+xml;charset=UTF-8";

/// Posts SOAP envelopes to one endpoint with Basic authentication.
#[derive(Clone)]
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    url: String,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, url: String, credentials: Credentials) -> Self {
        Self {
            client,
            url,
            credentials,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one envelope and parse the response document.
    pub async fn send(&self, envelope: String) -> Result<XmlNode> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .basic_auth(self.credentials.login(), Some(self.credentials.password()))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(WinRmError::InvalidCredentials(format!(
                "HTTP {} from {}",
                status.as_u16(),
                self.url
            )));
        }

        // Faults arrive with HTTP 500, but a parseable fault wins regardless of status
        let parsed = soap::parse(&body);
        if let Ok(root) = &parsed {
            if let Some(fault) = soap::fault(root) {
                return Err(fault);
            }
        }

        if !status.is_success() {
            return Err(WinRmError::Transport(format!(
                "bad HTTP response returned from server. Code {}",
                status.as_u16()
            )));
        }

        parsed
    }
}
