use clap::Parser;
use triage::cli::{AuthCommand, Cli, Command, ToolCommand};

#[test]
fn parses_auth_login() {
    let cli = Cli::try_parse_from(["triage", "auth", "login"]).expect("cli parse should work");
    match cli.command {
        Command::Auth(auth) => assert!(matches!(auth.command, AuthCommand::Login)),
        _ => panic!("expected auth command"),
    }
}

#[test]
fn parses_fetch_with_defaults() {
    let cli = Cli::try_parse_from(["triage", "fetch"]).expect("cli parse should work");
    match cli.command {
        Command::Fetch(fetch) => {
            assert_eq!(fetch.limit, 10);
            assert_eq!(fetch.out.to_str(), Some("emails.csv"));
        }
        _ => panic!("expected fetch command"),
    }
}

#[test]
fn parses_fetch_overrides() {
    let cli = Cli::try_parse_from(["triage", "fetch", "--limit", "3", "--out", "inbox.csv"])
        .expect("cli parse should work");
    match cli.command {
        Command::Fetch(fetch) => {
            assert_eq!(fetch.limit, 3);
            assert_eq!(fetch.out.to_str(), Some("inbox.csv"));
        }
        _ => panic!("expected fetch command"),
    }
}

#[test]
fn parses_draft() {
    let cli = Cli::try_parse_from([
        "triage",
        "draft",
        "--to",
        "dev@example.com",
        "--from",
        "me@example.com",
        "--subject",
        "hi",
        "--content",
        "hello",
        "--reply-to",
        "msg-9",
    ])
    .expect("cli parse should work");
    match cli.command {
        Command::Draft(draft) => {
            assert_eq!(draft.to, "dev@example.com");
            assert_eq!(draft.from, "me@example.com");
            assert_eq!(draft.subject, "hi");
            assert_eq!(draft.content.as_deref(), Some("hello"));
            assert_eq!(draft.reply_to.as_deref(), Some("msg-9"));
        }
        _ => panic!("expected draft command"),
    }
}

#[test]
fn draft_requires_addressing_flags() {
    let result = Cli::try_parse_from(["triage", "draft", "--content", "hello"]);
    assert!(result.is_err());
}

#[test]
fn parses_tool_call() {
    let cli = Cli::try_parse_from([
        "triage",
        "tool",
        "call",
        "fetch_unread",
        "--caller",
        "categorizer",
        "--args",
        r#"{"limit":5}"#,
    ])
    .expect("cli parse should work");
    match cli.command {
        Command::Tool(tool) => match tool.command {
            ToolCommand::Call(call) => {
                assert_eq!(call.name, "fetch_unread");
                assert_eq!(call.caller, "categorizer");
                assert_eq!(call.args, r#"{"limit":5}"#);
            }
            ToolCommand::Ls => panic!("expected tool call"),
        },
        _ => panic!("expected tool command"),
    }
}

#[test]
fn parses_report_with_defaults() {
    let cli = Cli::try_parse_from(["triage", "report"]).expect("cli parse should work");
    match cli.command {
        Command::Report(report) => {
            assert_eq!(report.db.to_str(), Some("logs.db"));
            assert_eq!(report.table, "chat_completions");
        }
        _ => panic!("expected report command"),
    }
}

#[test]
fn global_flags_apply_after_subcommand() {
    let cli = Cli::try_parse_from(["triage", "report", "--json", "--profile", "work", "-vv"])
        .expect("cli parse should work");
    assert!(cli.json);
    assert_eq!(cli.profile, "work");
    assert_eq!(cli.verbose, 2);
}
