use std::fs;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use triage::agent::AgentRole;
use triage::agent::dispatch::{CreateDraftArgs, FetchUnreadArgs, invoke};
use triage::agent::table::{CREATE_DRAFT, FETCH_UNREAD, TOOL_TABLE, authorize, find_tool};
use triage::api::client::MailClient;
use triage::auth::{MemoryCredentialStore, TokenSet};
use triage::config::Settings;
use triage::error::AppError;
use triage::ingest::DEFAULT_EXPORT_FILE;

const LIST_BODY: &str = r#"{"messages":[{"id":"m-1"}],"resultSizeEstimate":1}"#;
const MESSAGE_BODY: &str = r#"{"id":"m-1","threadId":"t-1","snippet":"quarterly numbers attached","payload":{"mimeType":"text/plain","headers":[{"name":"Subject","value":"Quarterly numbers"},{"name":"From","value":"alice@example.com"},{"name":"To","value":"bob@example.com"}],"body":{"data":"SGVsbG8"}}}"#;

fn offline_client() -> MailClient<MemoryCredentialStore> {
    MailClient::new(Settings::default(), MemoryCredentialStore::default(), "default")
}

fn valid_token() -> TokenSet {
    TokenSet {
        access_token: "at-test".to_string(),
        refresh_token: Some("rt-test".to_string()),
        expires_at_unix: Some(4_102_444_800),
        token_type: Some("Bearer".to_string()),
        scope: None,
        email: None,
    }
}

async fn spawn_mail_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(read) => {
                        head.extend_from_slice(&chunk[..read]);
                        if head.windows(4).any(|window| window == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }

            let body = if head.starts_with(b"GET /gmail/v1/users/me/messages/m-1") {
                MESSAGE_BODY
            } else {
                LIST_BODY
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}")
}

#[test]
fn the_tool_surface_is_enumerable() {
    let names = TOOL_TABLE.iter().map(|spec| spec.name).collect::<Vec<_>>();
    assert_eq!(names, [FETCH_UNREAD, CREATE_DRAFT]);

    for spec in TOOL_TABLE {
        assert_eq!(spec.executor, AgentRole::TaskHandler);
        assert!((spec.parameters)()["properties"].is_object());
    }
}

#[test]
fn capability_lists_gate_each_tool() {
    let fetch = find_tool(FETCH_UNREAD).expect("fetch tool exists");
    let draft = find_tool(CREATE_DRAFT).expect("draft tool exists");

    assert!(authorize(fetch, AgentRole::Categorizer).is_ok());
    assert!(authorize(draft, AgentRole::InquiryHandler).is_ok());
    assert!(authorize(fetch, AgentRole::InquiryHandler).is_err());
    assert!(authorize(draft, AgentRole::TaskHandler).is_err());
}

#[test]
fn tool_arguments_deserialize_with_defaults() {
    let fetch: FetchUnreadArgs = serde_json::from_value(json!({})).expect("defaults apply");
    assert_eq!(fetch.limit, 10);

    let draft: CreateDraftArgs = serde_json::from_value(json!({
        "content": "hi",
        "to": "a@x.com",
        "from": "b@x.com",
        "subject": "Hello"
    }))
    .expect("minimal draft args parse");
    assert!(!draft.reply);
    assert_eq!(draft.reply_to, None);
}

#[tokio::test]
async fn unauthorized_callers_are_refused_before_dispatch() {
    let client = offline_client();

    match invoke(&client, AgentRole::UserProxy, CREATE_DRAFT, json!({})).await {
        Err(AppError::Capability(message)) => {
            assert!(message.contains("user_proxy"));
            assert!(message.contains(CREATE_DRAFT));
        }
        other => panic!("expected capability error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_tools_are_reported_with_a_listing_hint() {
    let client = offline_client();

    match invoke(&client, AgentRole::Categorizer, "purge_inbox", json!({})).await {
        Err(AppError::InvalidInput(message)) => {
            assert!(message.contains("purge_inbox"));
            assert!(message.contains("triage tool ls"));
        }
        other => panic!("expected invalid input error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_arguments_fail_after_authorization() {
    let client = offline_client();

    match invoke(
        &client,
        AgentRole::Categorizer,
        FETCH_UNREAD,
        json!({"limit": "ten"}),
    )
    .await
    {
        Err(AppError::InvalidInput(message)) => assert!(message.contains(FETCH_UNREAD)),
        other => panic!("expected invalid input error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_tool_writes_the_export_artifact() {
    let base_url = spawn_mail_stub().await;
    let settings = Settings {
        api_base_url: Some(base_url),
        ..Settings::default()
    };
    let client = MailClient::new(
        settings,
        MemoryCredentialStore::with_token(valid_token()),
        "default",
    );

    let workdir = tempfile::tempdir().expect("temp dir");
    std::env::set_current_dir(workdir.path()).expect("enter temp dir");

    let result = invoke(&client, AgentRole::Categorizer, FETCH_UNREAD, json!({}))
        .await
        .expect("fetch tool succeeds against the stub");

    assert_eq!(result[0]["subject"], "Quarterly numbers");

    let written = fs::read_to_string(DEFAULT_EXPORT_FILE).expect("export artifact written");
    assert_eq!(
        written,
        "Subject,Snippet,From,To\n\
         Quarterly numbers,quarterly numbers attached,alice@example.com,bob@example.com\n"
    );
}

#[tokio::test]
async fn draft_submission_failure_surfaces_as_null_result() {
    let client = offline_client();

    let result = invoke(
        &client,
        AgentRole::InquiryHandler,
        CREATE_DRAFT,
        json!({
            "content": "hi",
            "to": "a@x.com",
            "from": "b@x.com",
            "subject": "Hello"
        }),
    )
    .await
    .expect("submission failures are swallowed");

    assert!(result.is_null());
}
