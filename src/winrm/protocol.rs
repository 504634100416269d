//! Windows remote shell operations.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::escape::escape;
use tracing::{debug, trace};

use super::soap::{self, RequestHeader, XmlNode};
use super::transport::HttpTransport;
use super::WinRmConfig;
use crate::client::CommandOutput;
use crate::error::WinRmError;
use crate::Result;

/// Output collected from one Receive round trip.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ReceivedChunk {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i64>,
}

/// Shell-level WS-Management operations against one endpoint.
#[derive(Clone)]
pub struct Protocol {
    transport: HttpTransport,
    config: Arc<WinRmConfig>,
}

impl Protocol {
    pub(crate) fn new(transport: HttpTransport, config: Arc<WinRmConfig>) -> Self {
        Self { transport, config }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        self.transport.url()
    }

    async fn send(&self, header: RequestHeader<'_>, body: &str) -> Result<XmlNode> {
        let envelope = soap::envelope(&self.config, self.transport.url(), &header, body);
        trace!(action = header.action, "sending WS-Management request");
        self.transport.send(envelope).await
    }

    /// Open a remote cmd shell and return its id.
    pub async fn open_shell(&self) -> Result<String> {
        let codepage = self.config.codepage.to_string();
        let options = [
            ("WINRS_NOPROFILE", "FALSE"),
            ("WINRS_CODEPAGE", codepage.as_str()),
        ];
        let body = concat!(
            "<rsp:Shell>",
            "<rsp:InputStreams>stdin</rsp:InputStreams>",
            "<rsp:OutputStreams>stdout stderr</rsp:OutputStreams>",
            "</rsp:Shell>"
        );

        let root = self
            .send(
                RequestHeader {
                    action: soap::ACTION_CREATE,
                    shell_id: None,
                    options: &options,
                },
                body,
            )
            .await?;

        let shell_id = parse_shell_id(&root)?;
        debug!(shell_id = %shell_id, url = %self.url(), "opened remote shell");
        Ok(shell_id)
    }

    /// Start `command` in the shell and return the command id.
    ///
    /// Arguments are joined with single spaces.
    pub async fn run_command(&self, shell_id: &str, command: &str, args: &[String]) -> Result<String> {
        let options = [
            ("WINRS_CONSOLEMODE_STDIN", "TRUE"),
            ("WINRS_SKIP_CMD_SHELL", "FALSE"),
        ];

        let mut body = format!(
            "<rsp:CommandLine><rsp:Command>{}</rsp:Command>",
            escape(command)
        );
        if !args.is_empty() {
            body.push_str(&format!(
                "<rsp:Arguments>{}</rsp:Arguments>",
                escape(args.join(" ").as_str())
            ));
        }
        body.push_str("</rsp:CommandLine>");

        let root = self
            .send(
                RequestHeader {
                    action: soap::ACTION_COMMAND,
                    shell_id: Some(shell_id),
                    options: &options,
                },
                &body,
            )
            .await?;

        root.find("CommandId")
            .map(|node| node.text.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| WinRmError::Xml("response has no CommandId".into()))
    }

    async fn receive(&self, shell_id: &str, command_id: &str) -> Result<ReceivedChunk> {
        let body = format!(
            r#"<rsp:Receive><rsp:DesiredStream CommandId="{}">stdout stderr</rsp:DesiredStream></rsp:Receive>"#,
            escape(command_id)
        );

        let root = self
            .send(
                RequestHeader {
                    action: soap::ACTION_RECEIVE,
                    shell_id: Some(shell_id),
                    options: &[],
                },
                &body,
            )
            .await?;

        parse_receive(&root)
    }

    /// Poll the command's output streams until it finishes.
    ///
    /// Operation timeouts are expected while a long command runs and are
    /// retried without limit; the command decides when output ends, and
    /// each request is still bounded by the HTTP read timeout.
    pub async fn get_command_output(&self, shell_id: &str, command_id: &str) -> Result<CommandOutput> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        loop {
            match self.receive(shell_id, command_id).await {
                Ok(chunk) => {
                    stdout.extend_from_slice(&chunk.stdout);
                    stderr.extend_from_slice(&chunk.stderr);
                    if let Some(code) = chunk.exit_code {
                        return Ok(CommandOutput::from_bytes(code, &stdout, &stderr));
                    }
                }
                Err(e) if e.is_operation_timeout() => {
                    debug!(command_id, "receive timed out, polling again");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send the terminate signal for a finished command.
    pub async fn cleanup_command(&self, shell_id: &str, command_id: &str) -> Result<()> {
        let body = format!(
            r#"<rsp:Signal CommandId="{}"><rsp:Code>{}</rsp:Code></rsp:Signal>"#,
            escape(command_id),
            soap::SIGNAL_TERMINATE
        );

        self.send(
            RequestHeader {
                action: soap::ACTION_SIGNAL,
                shell_id: Some(shell_id),
                options: &[],
            },
            &body,
        )
        .await?;
        Ok(())
    }

    /// Close the shell.
    pub async fn close_shell(&self, shell_id: &str) -> Result<()> {
        self.send(
            RequestHeader {
                action: soap::ACTION_DELETE,
                shell_id: Some(shell_id),
                options: &[],
            },
            "",
        )
        .await?;
        debug!(shell_id, "closed remote shell");
        Ok(())
    }

    /// Run one command in a fresh shell and collect its output.
    ///
    /// The shell is closed even if the command fails.
    pub async fn run(&self, command: &str, args: &[String]) -> Result<CommandOutput> {
        let shell_id = self.open_shell().await?;

        let result = self.run_in_shell(&shell_id, command, args).await;
        let closed = self.close_shell(&shell_id).await;

        let output = result?;
        closed?;
        Ok(output)
    }

    async fn run_in_shell(&self, shell_id: &str, command: &str, args: &[String]) -> Result<CommandOutput> {
        let command_id = self.run_command(shell_id, command, args).await?;
        let output = self.get_command_output(shell_id, &command_id).await?;
        self.cleanup_command(shell_id, &command_id).await?;
        Ok(output)
    }
}

fn parse_shell_id(root: &XmlNode) -> Result<String> {
    let from_selector = root
        .find_all("Selector")
        .into_iter()
        .find(|node| node.attr("Name") == Some("ShellId"))
        .map(|node| node.text.trim().to_string());

    from_selector
        .or_else(|| root.find("ShellId").map(|node| node.text.trim().to_string()))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| WinRmError::Xml("response has no ShellId".into()))
}

fn parse_receive(root: &XmlNode) -> Result<ReceivedChunk> {
    let mut chunk = ReceivedChunk::default();

    for stream in root.find_all("Stream") {
        let data = stream.text.trim();
        if data.is_empty() {
            continue;
        }
        let decoded = STANDARD
            .decode(data)
            .map_err(|e| WinRmError::Xml(format!("invalid stream data: {e}")))?;
        match stream.attr("Name") {
            Some("stdout") => chunk.stdout.extend_from_slice(&decoded),
            Some("stderr") => chunk.stderr.extend_from_slice(&decoded),
            _ => {}
        }
    }

    let done = root
        .find_all("CommandState")
        .into_iter()
        .any(|node| node.attr("State") == Some(soap::COMMAND_STATE_DONE));

    if done {
        let code = root
            .find("ExitCode")
            .ok_or_else(|| WinRmError::Xml("finished command has no ExitCode".into()))?;
        let code = code
            .text
            .trim()
            .parse::<i64>()
            .map_err(|e| WinRmError::Xml(format!("invalid ExitCode: {e}")))?;
        chunk.exit_code = Some(code);
    }

    Ok(chunk)
}
