//! WinRM client integration tests.
//!
//! A small WS-Management endpoint runs in-process on a random port and
//! answers each request based on its SOAP action.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use winrm_keywords::{WinRmConfig, WinRmError, WinRmLibrary};

const LOGIN: &str = "Administrator";
const PASSWORD: &str = "P@ssw0rd";

const SHELL_ID: &str = "0A1B2C3D-0000-4000-8000-000000000001";
const COMMAND_ID: &str = "9F8E7D6C-0000-4000-8000-000000000002";

const TIMEOUT_FAULT: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><s:Fault><s:Code><s:Value>s:Receiver</s:Value><s:Subcode><s:Value>w:TimedOut</s:Value></s:Subcode></s:Code><s:Reason><s:Text xml:lang="en-US">The WS-Management service cannot complete the operation within the time specified in OperationTimeout.</s:Text></s:Reason><s:Detail><f:WSManFault xmlns:f="http://schemas.microsoft.com/wbem/wsman/1/wsmanfault" Code="2150858793" Machine="win-01"><f:Message>The operation timed out.</f:Message></f:WSManFault></s:Detail></s:Fault></s:Body></s:Envelope>"#;

const ACCESS_FAULT: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><s:Fault><s:Code><s:Value>s:Sender</s:Value><s:Subcode><s:Value>w:AccessDenied</s:Value></s:Subcode></s:Code><s:Reason><s:Text xml:lang="en-US">Access is denied.</s:Text></s:Reason><s:Detail><f:WSManFault xmlns:f="http://schemas.microsoft.com/wbem/wsman/1/wsmanfault" Code="5" Machine="win-01"><f:Message>Access is denied. </f:Message></f:WSManFault></s:Detail></s:Fault></s:Body></s:Envelope>"#;

const UNICODE_OUTPUT: &str = " Verzeichnis von C:\\Größe\r\n└─ fertig\r\n";
// Inside the two-byte encoding of 'ö'
const UNICODE_SPLIT: usize = 23;

const EMPTY_RESPONSE: &str =
    r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Header/><s:Body/></s:Envelope>"#;

/// How the fake endpoint answers.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Two output chunks after one operation timeout, exit code 0.
    Cmd,
    /// CLIXML error output, exit code 1.
    PowerShell,
    /// Command request is rejected with an access fault.
    FailCommand,
    /// UTF-8 output with a character split across two receives.
    Unicode,
}

struct FakeHost {
    mode: Mode,
    receives: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl FakeHost {
    fn actions(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|body| action_name(body).to_string())
            .collect()
    }

    fn request(&self, action: &str) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|body| action_name(body) == action)
            .cloned()
    }
}

fn action_name(body: &str) -> &'static str {
    if body.contains("/windows/shell/Receive<") {
        "Receive"
    } else if body.contains("/windows/shell/Signal<") {
        "Signal"
    } else if body.contains("/windows/shell/Command<") {
        "Command"
    } else if body.contains("/transfer/Create<") {
        "Create"
    } else if body.contains("/transfer/Delete<") {
        "Delete"
    } else {
        "Unknown"
    }
}

fn soap(status: StatusCode, body: String) -> axum::response::Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/soap+xml;charset=UTF-8")],
        body,
    )
        .into_response()
}

fn stream(name: &str, data: impl AsRef<[u8]>) -> String {
    format!(
        r#"<rsp:Stream Name="{}" CommandId="{}">{}</rsp:Stream>"#,
        name,
        COMMAND_ID,
        STANDARD.encode(data)
    )
}

fn receive_response(streams: &str, exit_code: Option<i64>) -> String {
    let state = match exit_code {
        Some(code) => format!(
            r#"<rsp:CommandState CommandId="{COMMAND_ID}" State="http://schemas.microsoft.com/wbem/wsman/1/windows/shell/CommandState/Done"><rsp:ExitCode>{code}</rsp:ExitCode></rsp:CommandState>"#
        ),
        None => format!(
            r#"<rsp:CommandState CommandId="{COMMAND_ID}" State="http://schemas.microsoft.com/wbem/wsman/1/windows/shell/CommandState/Running"/>"#
        ),
    };
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:rsp="http://schemas.microsoft.com/wbem/wsman/1/windows/shell"><s:Body><rsp:ReceiveResponse>{streams}{state}</rsp:ReceiveResponse></s:Body></s:Envelope>"#
    )
}

async fn wsman(
    State(host): State<Arc<FakeHost>>,
    headers: HeaderMap,
    body: String,
) -> axum::response::Response {
    let expected = format!("Basic {}", STANDARD.encode(format!("{LOGIN}:{PASSWORD}")));
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let action = action_name(&body);
    host.requests.lock().unwrap().push(body);

    match action {
        "Create" => soap(
            StatusCode::OK,
            format!(
                r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:w="http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd"><s:Body><x:ResourceCreated xmlns:x="http://schemas.xmlsoap.org/ws/2004/09/transfer"><a:ReferenceParameters xmlns:a="http://schemas.xmlsoap.org/ws/2004/08/addressing"><w:SelectorSet><w:Selector Name="ShellId">{SHELL_ID}</w:Selector></w:SelectorSet></a:ReferenceParameters></x:ResourceCreated></s:Body></s:Envelope>"#
            ),
        ),
        "Command" if host.mode == Mode::FailCommand => {
            soap(StatusCode::INTERNAL_SERVER_ERROR, ACCESS_FAULT.to_string())
        }
        "Command" => soap(
            StatusCode::OK,
            format!(
                r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:rsp="http://schemas.microsoft.com/wbem/wsman/1/windows/shell"><s:Body><rsp:CommandResponse><rsp:CommandId>{COMMAND_ID}</rsp:CommandId></rsp:CommandResponse></s:Body></s:Envelope>"#
            ),
        ),
        "Receive" => {
            let round = host.receives.fetch_add(1, Ordering::SeqCst);
            match (host.mode, round) {
                (Mode::Cmd, 0) => soap(StatusCode::INTERNAL_SERVER_ERROR, TIMEOUT_FAULT.to_string()),
                (Mode::Cmd, 1) => soap(
                    StatusCode::OK,
                    receive_response(&stream("stdout", "Windows IP Configuration\r\n"), None),
                ),
                (Mode::Cmd, _) => soap(
                    StatusCode::OK,
                    receive_response(&stream("stdout", "   Host Name . . . : WIN-01\r\n"), Some(0)),
                ),
                (Mode::Unicode, 0) => {
                    let bytes = UNICODE_OUTPUT.as_bytes();
                    soap(
                        StatusCode::OK,
                        receive_response(&stream("stdout", &bytes[..UNICODE_SPLIT]), None),
                    )
                }
                (Mode::Unicode, _) => {
                    let bytes = UNICODE_OUTPUT.as_bytes();
                    soap(
                        StatusCode::OK,
                        receive_response(&stream("stdout", &bytes[UNICODE_SPLIT..]), Some(0)),
                    )
                }
                (_, _) => soap(
                    StatusCode::OK,
                    receive_response(
                        &stream(
                            "stderr",
                            "#< CLIXML\r\n<Objs Version=\"1.1.0.1\" xmlns=\"http://schemas.microsoft.com/powershell/2004/04\"><S S=\"Error\">Get-Item : Cannot find path_x000D__x000A_</S><S S=\"Error\">    + FullyQualifiedErrorId : PathNotFound_x000D__x000A_</S></Objs>",
                        ),
                        Some(1),
                    ),
                ),
            }
        }
        "Signal" | "Delete" => soap(StatusCode::OK, EMPTY_RESPONSE.to_string()),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// Start a fake endpoint and return it with its `host:port` target.
async fn start_host(mode: Mode) -> (Arc<FakeHost>, String) {
    let host = Arc::new(FakeHost {
        mode,
        receives: AtomicUsize::new(0),
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/wsman", post(wsman))
        .with_state(Arc::clone(&host));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (host, addr.to_string())
}

fn library() -> WinRmLibrary {
    WinRmLibrary::with_config(WinRmConfig::default()).unwrap()
}

#[tokio::test]
async fn test_run_cmd_collects_output_across_receives() {
    let (host, target) = start_host(Mode::Cmd).await;
    let lib = library();

    lib.create_session("server", &target, LOGIN, PASSWORD).unwrap();
    let output = lib
        .run_cmd("server", "ipconfig", Some(&["/all".to_string()]))
        .await
        .unwrap();

    assert_eq!(output.status_code, 0);
    assert_eq!(
        output.std_out,
        "Windows IP Configuration\r\n   Host Name . . . : WIN-01\r\n"
    );
    assert_eq!(output.std_err, "");

    assert_eq!(
        host.actions(),
        vec!["Create", "Command", "Receive", "Receive", "Receive", "Signal", "Delete"]
    );

    let command = host.request("Command").unwrap();
    assert!(command.contains("<rsp:Command>ipconfig</rsp:Command>"));
    assert!(command.contains("<rsp:Arguments>/all</rsp:Arguments>"));
    assert!(command.contains(SHELL_ID));

    let delete = host.request("Delete").unwrap();
    assert!(delete.contains(SHELL_ID));
}

#[tokio::test]
async fn test_run_ps_encodes_script_and_cleans_errors() {
    let (host, target) = start_host(Mode::PowerShell).await;
    let lib = library();

    lib.create_session("server", &target, LOGIN, PASSWORD).unwrap();
    let output = lib.run_ps("server", "Get-Item C:\\missing").await.unwrap();

    assert_eq!(output.status_code, 1);
    assert_eq!(output.std_out, "");
    assert_eq!(
        output.std_err,
        "Get-Item : Cannot find path\n    + FullyQualifiedErrorId : PathNotFound"
    );

    let command = host.request("Command").unwrap();
    assert!(command.contains("powershell -encodedcommand "));
    assert!(!command.contains("Get-Item"));
}

#[tokio::test]
async fn test_rejected_credentials() {
    let (host, target) = start_host(Mode::Cmd).await;
    let lib = library();

    lib.create_session("server", &target, LOGIN, "wrong").unwrap();
    let err = lib.run_cmd("server", "dir", None).await.unwrap_err();

    assert!(matches!(err, WinRmError::InvalidCredentials(_)));
    assert!(!err.to_string().contains("wrong"));
    assert!(host.actions().is_empty());
}

#[tokio::test]
async fn test_fault_closes_shell() {
    let (host, target) = start_host(Mode::FailCommand).await;
    let lib = library();

    lib.create_session("server", &target, LOGIN, PASSWORD).unwrap();
    let err = lib.run_cmd("server", "dir", None).await.unwrap_err();

    match err {
        WinRmError::WsManFault {
            code,
            wsman_code,
            reason,
            ..
        } => {
            assert_eq!(code, "s:Sender");
            assert_eq!(wsman_code.as_deref(), Some("5"));
            assert_eq!(reason, "Access is denied.");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(host.actions(), vec!["Create", "Command", "Delete"]);
}

#[tokio::test]
async fn test_sessions_route_to_their_hosts() {
    let (first, first_target) = start_host(Mode::Cmd).await;
    let (second, second_target) = start_host(Mode::PowerShell).await;
    let lib = library();

    assert_eq!(lib.create_session("a", &first_target, LOGIN, PASSWORD).unwrap(), 0);
    assert_eq!(lib.create_session("b", &second_target, LOGIN, PASSWORD).unwrap(), 1);

    lib.run_ps("b", "$PSVersionTable").await.unwrap();
    assert!(first.actions().is_empty());
    assert!(!second.actions().is_empty());

    lib.run_cmd("0", "hostname", None).await.unwrap();
    assert!(!first.actions().is_empty());

    let command = first.request("Command").unwrap();
    assert!(!command.contains("<rsp:Arguments>"));
}

#[tokio::test]
async fn test_unreachable_host() {
    let lib = library();

    lib.create_session("server", "127.0.0.1:1", LOGIN, PASSWORD).unwrap();
    let err = lib.run_cmd("server", "dir", None).await.unwrap_err();

    assert!(matches!(err, WinRmError::Http(_)));
}

#[tokio::test]
async fn test_non_ascii_output_is_unchanged() {
    assert!(!UNICODE_OUTPUT.is_char_boundary(UNICODE_SPLIT));

    let (host, target) = start_host(Mode::Unicode).await;
    let lib = library();

    lib.create_session("server", &target, LOGIN, PASSWORD).unwrap();
    let output = lib.run_cmd("server", "dir", None).await.unwrap();

    assert_eq!(output.status_code, 0);
    assert_eq!(output.std_out, UNICODE_OUTPUT);

    let create = host.request("Create").unwrap();
    assert!(create.contains(r#"<w:Option Name="WINRS_CODEPAGE">65001</w:Option>"#));
}

#[tokio::test]
async fn test_unusable_target_fails_on_command() {
    let lib = library();

    assert_eq!(lib.create_session("server", "host1:99999", LOGIN, PASSWORD).unwrap(), 0);
    assert_eq!(lib.create_session("other", "", LOGIN, PASSWORD).unwrap(), 1);

    let err = lib.run_cmd("server", "dir", None).await.unwrap_err();
    assert!(matches!(err, WinRmError::InvalidParameter(_)));

    let err = lib.run_ps("other", "Get-Date").await.unwrap_err();
    assert!(matches!(err, WinRmError::InvalidParameter(_)));
}
