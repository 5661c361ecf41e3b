use std::fs;
use std::path::Path;

use crate::api::client::MailClient;
use crate::api::models::{EmailSummary, OriginalMessage, header_last};
use crate::auth::store::CredentialStore;
use crate::error::AppResult;

pub const DEFAULT_EXPORT_FILE: &str = "emails.csv";

const EXPORT_HEADER: &str = "Subject,Snippet,From,To";

pub async fn list_unread_and_summarize<S: CredentialStore>(
    client: &MailClient<S>,
    limit: u32,
) -> AppResult<Vec<EmailSummary>> {
    let messages = client.list_unread(limit).await?;
    Ok(messages.iter().map(summarize).collect())
}

pub fn summarize(message: &OriginalMessage) -> EmailSummary {
    EmailSummary {
        id: message.id.clone(),
        subject: header_last(&message.headers, "Subject").map(ToOwned::to_owned),
        snippet: message.snippet.clone(),
        from: header_last(&message.headers, "From").map(ToOwned::to_owned),
        to: header_last(&message.headers, "To").map(ToOwned::to_owned),
    }
}

pub fn write_export(path: &Path, summaries: &[EmailSummary]) -> AppResult<()> {
    let mut out = String::new();
    out.push_str(EXPORT_HEADER);
    out.push('\n');

    for summary in summaries {
        let row = [
            summary.subject.as_deref().unwrap_or_default(),
            summary.snippet.as_deref().unwrap_or_default(),
            summary.from.as_deref().unwrap_or_default(),
            summary.to.as_deref().unwrap_or_default(),
        ]
        .map(csv_field)
        .join(",");
        out.push_str(&row);
        out.push('\n');
    }

    fs::write(path, out)?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn format_preview(snippet: Option<&str>) -> String {
    let snippet = snippet.unwrap_or("(no preview)");
    let decoded = html_escape::decode_html_entities(snippet).to_string();
    let compact = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if compact.len() <= 120 {
        return compact;
    }

    let mut end = 120;
    while !compact.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &compact[..end])
}
