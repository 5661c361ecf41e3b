use std::fs;
use std::io::{self, Read};

use crate::cli::DraftArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::mail::compose::{ComposeRequest, compose_draft};

pub async fn run(ctx: &AppContext, args: DraftArgs) -> AppResult<()> {
    let content = read_content(&args)?;
    let request = ComposeRequest {
        content,
        to: args.to,
        from: args.from,
        subject: args.subject,
        reply_to: args.reply_to.clone(),
        is_reply: args.reply_to.is_some(),
    };

    match compose_draft(&ctx.mail, &request).await? {
        Some(receipt) => {
            let text = format!("created draft {}", receipt.draft_id);
            ctx.output.emit(&text, &receipt)
        }
        None => ctx
            .output
            .emit("no draft created", &serde_json::Value::Null),
    }
}

fn read_content(args: &DraftArgs) -> AppResult<String> {
    let mut selected = 0;

    if args.content.is_some() {
        selected += 1;
    }
    if args.content_file.is_some() {
        selected += 1;
    }
    if args.stdin {
        selected += 1;
    }

    if selected == 0 {
        return Err(AppError::InvalidInput(
            "missing draft body; pass one of --content, --content-file, or --stdin".to_string(),
        ));
    }

    if selected > 1 {
        return Err(AppError::InvalidInput(
            "pass only one body source: --content, --content-file, or --stdin".to_string(),
        ));
    }

    if let Some(content) = &args.content {
        return Ok(content.clone());
    }

    if let Some(path) = &args.content_file {
        return Ok(fs::read_to_string(path)?);
    }

    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}
