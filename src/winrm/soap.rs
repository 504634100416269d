//! SOAP envelopes and response parsing.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use uuid::Uuid;

use super::WinRmConfig;
use crate::error::WinRmError;
use crate::Result;

pub(crate) const RESOURCE_URI_CMD: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/cmd";

pub(crate) const ACTION_CREATE: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer/Create";
pub(crate) const ACTION_DELETE: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer/Delete";
pub(crate) const ACTION_COMMAND: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/Command";
pub(crate) const ACTION_RECEIVE: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/Receive";
pub(crate) const ACTION_SIGNAL: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/Signal";

pub(crate) const SIGNAL_TERMINATE: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/signal/terminate";
pub(crate) const COMMAND_STATE_DONE: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/CommandState/Done";

const ANONYMOUS_ADDRESS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous";

/// WSManFault code for an expired `OperationTimeout`.
pub(crate) const WSMAN_OPERATION_TIMEOUT: &str = "2150858793";

/// Addressing and option headers of one WS-Management request.
pub(crate) struct RequestHeader<'a> {
    pub action: &'a str,
    pub shell_id: Option<&'a str>,
    pub options: &'a [(&'a str, &'a str)],
}

/// Wrap `body` in a complete WS-Management envelope.
pub(crate) fn envelope(
    config: &WinRmConfig,
    url: &str,
    header: &RequestHeader<'_>,
    body: &str,
) -> String {
    let mut xml = String::with_capacity(2048 + body.len());

    xml.push_str(concat!(
        r#"<?xml version="1.0" encoding="utf-8"?>"#,
        r#"<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema""#,
        r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
        r#" xmlns:env="http://www.w3.org/2003/05/soap-envelope""#,
        r#" xmlns:a="http://schemas.xmlsoap.org/ws/2004/08/addressing""#,
        r#" xmlns:b="http://schemas.dmtf.org/wbem/wsman/1/cimbinding.xsd""#,
        r#" xmlns:n="http://schemas.xmlsoap.org/ws/2004/09/enumeration""#,
        r#" xmlns:x="http://schemas.xmlsoap.org/ws/2004/09/transfer""#,
        r#" xmlns:w="http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd""#,
        r#" xmlns:p="http://schemas.microsoft.com/wbem/wsman/1/wsman.xsd""#,
        r#" xmlns:rsp="http://schemas.microsoft.com/wbem/wsman/1/windows/shell""#,
        r#" xmlns:cfg="http://schemas.microsoft.com/wbem/wsman/1/config">"#,
        "<env:Header>",
    ));

    xml.push_str(&format!("<a:To>{}</a:To>", escape(url)));
    xml.push_str(&format!(
        r#"<a:ReplyTo><a:Address mustUnderstand="true">{ANONYMOUS_ADDRESS}</a:Address></a:ReplyTo>"#
    ));
    xml.push_str(&format!(
        r#"<w:MaxEnvelopeSize mustUnderstand="true">{}</w:MaxEnvelopeSize>"#,
        config.max_envelope_size
    ));
    xml.push_str(&format!("<a:MessageID>uuid:{}</a:MessageID>", Uuid::new_v4()));
    let locale = escape(&config.locale);
    xml.push_str(&format!(
        r#"<w:Locale xml:lang="{locale}" mustUnderstand="false"/><p:DataLocale xml:lang="{locale}" mustUnderstand="false"/>"#
    ));
    xml.push_str(&format!(
        "<w:OperationTimeout>{}</w:OperationTimeout>",
        config.operation_timeout_iso()
    ));
    xml.push_str(&format!(
        r#"<w:ResourceURI mustUnderstand="true">{RESOURCE_URI_CMD}</w:ResourceURI>"#
    ));
    xml.push_str(&format!(
        r#"<a:Action mustUnderstand="true">{}</a:Action>"#,
        header.action
    ));

    if let Some(shell_id) = header.shell_id {
        xml.push_str(&format!(
            r#"<w:SelectorSet><w:Selector Name="ShellId">{}</w:Selector></w:SelectorSet>"#,
            escape(shell_id)
        ));
    }

    if !header.options.is_empty() {
        xml.push_str("<w:OptionSet>");
        for (name, value) in header.options {
            xml.push_str(&format!(
                r#"<w:Option Name="{}">{}</w:Option>"#,
                escape(*name),
                escape(*value)
            ));
        }
        xml.push_str("</w:OptionSet>");
    }

    xml.push_str("</env:Header><env:Body>");
    xml.push_str(body);
    xml.push_str("</env:Body></env:Envelope>");
    xml
}

/// A parsed XML element, keyed by local name (namespace prefixes dropped).
#[derive(Debug, Clone, Default)]
pub(crate) struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| WinRmError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| WinRmError::Xml(e.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }

        Ok(Self {
            name,
            attrs,
            ..Default::default()
        })
    }

    /// Get an attribute by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get the first direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Get the first descendant (depth-first) with the given local name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Collect every descendant with the given local name, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlNode> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }
}

/// Parse an XML document into its root element.
pub(crate) fn parse(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![XmlNode::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(XmlNode::from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let node = XmlNode::from_start(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(WinRmError::Xml("unbalanced end tag".into()));
                }
                if let Some(node) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| WinRmError::Xml(e.to_string()))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(WinRmError::Xml(format!(
                    "{} at position {}",
                    e,
                    reader.error_position()
                )))
            }
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(WinRmError::Xml("unclosed element at end of document".into()));
    }

    stack
        .pop()
        .and_then(|document| document.children.into_iter().next())
        .ok_or_else(|| WinRmError::Xml("empty document".into()))
}

/// Extract a SOAP fault from a parsed response, if it carries one.
///
/// The operation-timeout fault maps to [`WinRmError::OperationTimeout`].
pub(crate) fn fault(root: &XmlNode) -> Option<WinRmError> {
    let fault = root.find("Fault")?;

    let code_node = fault.child("Code");
    let code = code_node
        .and_then(|c| c.child("Value"))
        .map(|v| v.text.trim().to_string())
        .unwrap_or_default();
    let subcode = code_node
        .and_then(|c| c.child("Subcode"))
        .and_then(|s| s.child("Value"))
        .map(|v| v.text.trim().to_string());

    let wsman_fault = fault.find("WSManFault");
    let wsman_code = wsman_fault.and_then(|w| w.attr("Code")).map(str::to_string);

    if wsman_code.as_deref() == Some(WSMAN_OPERATION_TIMEOUT) {
        return Some(WinRmError::OperationTimeout);
    }

    let reason = wsman_fault
        .and_then(|w| w.child("Message"))
        .map(|m| m.text.trim().to_string())
        .filter(|m| !m.is_empty())
        .or_else(|| {
            fault
                .child("Reason")
                .and_then(|r| r.child("Text"))
                .map(|t| t.text.trim().to_string())
        })
        .unwrap_or_default();

    Some(WinRmError::WsManFault {
        code,
        subcode,
        wsman_code,
        reason,
    })
}
