use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::api::client::MailClient;
use crate::api::models::{DraftReceipt, OriginalMessage};
use crate::auth::store::CredentialStore;
use crate::error::{AppError, AppResult};

use super::mime::{self, DraftContent};

#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub content: String,
    pub to: String,
    pub from: String,
    pub subject: String,
    pub reply_to: Option<String>,
    pub is_reply: bool,
}

#[derive(Debug, Clone)]
pub struct PreparedDraft {
    pub raw_message: String,
    pub thread_id: Option<String>,
}

// Pre-submit failures propagate; a failed submission must not abort a triage batch.
pub async fn compose_draft<S: CredentialStore>(
    client: &MailClient<S>,
    request: &ComposeRequest,
) -> AppResult<Option<DraftReceipt>> {
    let prepared = if request.is_reply {
        let original_id = request.reply_to.as_deref().ok_or_else(|| {
            AppError::InvalidInput(
                "reply requested without an original message id; pass --reply-to".to_string(),
            )
        })?;

        let original = client.get_message(original_id).await.map_err(|err| {
            AppError::ThreadResolution(format!(
                "could not fetch original message {original_id}: {err}"
            ))
        })?;

        prepare_reply(request, &original)?
    } else {
        prepare_fresh(request)
    };

    match client
        .create_draft(&prepared.raw_message, prepared.thread_id.as_deref())
        .await
    {
        Ok(receipt) => Ok(Some(receipt)),
        Err(err) => {
            tracing::warn!("draft creation failed: {err}");
            Ok(None)
        }
    }
}

pub fn prepare_fresh(request: &ComposeRequest) -> PreparedDraft {
    let raw_message = mime::build_raw_draft(&DraftContent {
        to: request.to.clone(),
        from: request.from.clone(),
        subject: request.subject.clone(),
        body: request.content.clone(),
    });

    PreparedDraft {
        raw_message,
        thread_id: None,
    }
}

pub fn prepare_reply(
    request: &ComposeRequest,
    original: &OriginalMessage,
) -> AppResult<PreparedDraft> {
    let body = reply_body(&request.content, original)?;
    let raw_message = mime::build_raw_draft(&DraftContent {
        to: request.to.clone(),
        from: request.from.clone(),
        subject: request.subject.clone(),
        body,
    });

    Ok(PreparedDraft {
        raw_message,
        thread_id: original.thread_id.clone(),
    })
}

fn reply_body(content: &str, original: &OriginalMessage) -> AppResult<String> {
    let data = original.body_data.as_deref().ok_or_else(|| {
        AppError::Decode(format!(
            "message {} carries no decodable text body",
            original.id
        ))
    })?;

    let original_body = decode_message_body(data)?;
    let attribution = attribution_line(original.date(), original.sender());
    let quoted = quote_original(&original_body);

    Ok(format!("{content}\n\n{attribution}\n{quoted}"))
}

pub fn decode_message_body(data: &str) -> AppResult<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .map_err(|err| AppError::Decode(format!("original body is not valid base64url: {err}")))?;

    String::from_utf8(bytes)
        .map_err(|err| AppError::Decode(format!("original body is not valid utf-8: {err}")))
}

pub fn quote_original(body: &str) -> String {
    body.split('\n')
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn attribution_line(date: Option<&str>, sender: Option<&str>) -> String {
    match (date, sender) {
        (Some(date), Some(sender)) => format!("On {date} {sender} wrote:"),
        (Some(date), None) => format!("On {date} wrote:"),
        (None, Some(sender)) => format!("{sender} wrote:"),
        (None, None) => "The original message said:".to_string(),
    }
}
