//! PowerShell script encoding and error cleanup.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::soap;

const CLIXML_PREFIX: &str = "#< CLIXML\r\n";
const CLIXML_NEWLINE: &str = "_x000D__x000A_";

/// Encode a script for `powershell -encodedcommand`: base64 of UTF-16LE.
pub fn encode_script(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}

/// Command line that runs `script` in a remote PowerShell.
pub fn command_line(script: &str) -> String {
    format!("powershell -encodedcommand {}", encode_script(script))
}

/// Turn a CLIXML-serialized error stream into plain text.
///
/// Messages that are not CLIXML are returned unchanged, as are CLIXML
/// messages that fail to parse or carry no text.
pub fn clean_error_msg(msg: &str) -> String {
    let Some(xml) = msg.strip_prefix(CLIXML_PREFIX) else {
        return msg.to_string();
    };

    let root = match soap::parse(xml) {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!(error = %e, "There was a problem converting the Powershell error message");
            return msg.to_string();
        }
    };

    let cleaned: String = root
        .children
        .iter()
        .filter(|node| node.name == "S")
        .map(|node| node.text.replace(CLIXML_NEWLINE, "\n"))
        .collect();

    if cleaned.is_empty() {
        msg.to_string()
    } else {
        cleaned.trim().to_string()
    }
}
