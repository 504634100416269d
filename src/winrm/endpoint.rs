//! WS-Management endpoint URLs.

use super::Transport;
use crate::error::WinRmError;
use crate::Result;

/// Build the endpoint URL for a target of the form
/// `[scheme://]host[:port][/wsman]`.
///
/// A missing scheme comes from the transport. A missing port follows the
/// scheme: 5985 for `http`, 5986 for `https`. The path defaults to `wsman`.
pub fn build_url(target: &str, transport: Transport) -> Result<String> {
    let target = target.trim();

    let (scheme, rest) = match target.split_once("://") {
        Some((scheme, rest)) => {
            let scheme = scheme.to_ascii_lowercase();
            if scheme != "http" && scheme != "https" {
                return Err(WinRmError::InvalidParameter(format!(
                    "unsupported scheme '{scheme}' in target '{target}'"
                )));
            }
            (scheme, rest)
        }
        None => (transport.scheme().to_string(), target),
    };

    let host_end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(rest.len());
    let host = &rest[..host_end];
    if host.is_empty() {
        return Err(WinRmError::InvalidParameter(format!(
            "no hostname in target '{target}'"
        )));
    }
    let mut rest = &rest[host_end..];

    let port = match rest.strip_prefix(':') {
        Some(after) => {
            let digits_end = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            let port: u16 = after[..digits_end].parse().map_err(|_| {
                WinRmError::InvalidParameter(format!("invalid port in target '{target}'"))
            })?;
            rest = &after[digits_end..];
            port
        }
        None if scheme == "https" => Transport::Ssl.default_port(),
        None => Transport::Plaintext.default_port(),
    };

    let path = rest.trim_start_matches('/');
    let path = if path.is_empty() { "wsman" } else { path };

    Ok(format!("{scheme}://{host}:{port}/{path}"))
}
