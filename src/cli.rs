use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::ingest::DEFAULT_EXPORT_FILE;
use crate::report::{DEFAULT_LOG_DB, DEFAULT_LOG_TABLE};

#[derive(Debug, Parser)]
#[command(name = "triage", version, about = "Email triage toolkit")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Auth(AuthArgs),
    Fetch(FetchArgs),
    Draft(DraftArgs),
    Tool(ToolArgs),
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    Login,
    Status,
    Logout,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    #[arg(long, default_value_t = 10, help = "Maximum unread messages to fetch")]
    pub limit: u32,
    #[arg(long, default_value = DEFAULT_EXPORT_FILE, help = "Export file path")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    #[arg(long, help = "Recipient address")]
    pub to: String,
    #[arg(long, help = "Sender address")]
    pub from: String,
    #[arg(long, visible_alias = "subj", help = "Subject line")]
    pub subject: String,
    #[arg(long, help = "Inline draft body")]
    pub content: Option<String>,
    #[arg(long, help = "Read draft body from file")]
    pub content_file: Option<PathBuf>,
    #[arg(long, help = "Read draft body from stdin")]
    pub stdin: bool,
    #[arg(long, help = "Reply to an existing message id, quoting it")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Args)]
pub struct ToolArgs {
    #[command(subcommand)]
    pub command: ToolCommand,
}

#[derive(Debug, Subcommand)]
pub enum ToolCommand {
    Ls,
    Call(ToolCallArgs),
}

#[derive(Debug, Args)]
pub struct ToolCallArgs {
    #[arg(help = "Tool name")]
    pub name: String,
    #[arg(long, help = "Agent role requesting the call")]
    pub caller: String,
    #[arg(long, default_value = "{}", help = "Tool arguments as a JSON object")]
    pub args: String,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(long, default_value = DEFAULT_LOG_DB, help = "Usage log database path")]
    pub db: PathBuf,
    #[arg(long, default_value = DEFAULT_LOG_TABLE, help = "Usage log table name")]
    pub table: String,
}
