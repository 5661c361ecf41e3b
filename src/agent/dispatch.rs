use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::client::MailClient;
use crate::auth::store::CredentialStore;
use crate::error::{AppError, AppResult};
use crate::ingest;
use crate::mail::compose::{ComposeRequest, compose_draft};

use super::AgentRole;
use super::table::{self, CREATE_DRAFT, FETCH_UNREAD};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchUnreadArgs {
    #[serde(default = "default_fetch_limit")]
    pub limit: u32,
}

fn default_fetch_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDraftArgs {
    pub content: String,
    pub to: String,
    pub from: String,
    pub subject: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub reply: bool,
}

pub async fn invoke<S: CredentialStore>(
    client: &MailClient<S>,
    caller: AgentRole,
    tool_name: &str,
    args: serde_json::Value,
) -> AppResult<serde_json::Value> {
    let spec = table::find_tool(tool_name).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "unknown tool `{tool_name}`; run `triage tool ls` to see the tool surface"
        ))
    })?;
    table::authorize(spec, caller)?;

    match spec.name {
        FETCH_UNREAD => {
            let args: FetchUnreadArgs = parse_args(tool_name, args)?;
            let summaries = ingest::list_unread_and_summarize(client, args.limit).await?;
            ingest::write_export(Path::new(ingest::DEFAULT_EXPORT_FILE), &summaries)?;
            Ok(serde_json::to_value(summaries)?)
        }
        CREATE_DRAFT => {
            let args: CreateDraftArgs = parse_args(tool_name, args)?;
            let request = ComposeRequest {
                content: args.content,
                to: args.to,
                from: args.from,
                subject: args.subject,
                reply_to: args.reply_to,
                is_reply: args.reply,
            };
            let receipt = compose_draft(client, &request).await?;
            Ok(serde_json::to_value(receipt)?)
        }
        other => Err(AppError::InvalidInput(format!(
            "tool `{other}` has no dispatcher"
        ))),
    }
}

fn parse_args<T: DeserializeOwned>(tool_name: &str, args: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(args)
        .map_err(|err| AppError::InvalidInput(format!("invalid arguments for `{tool_name}`: {err}")))
}
