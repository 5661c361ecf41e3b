use crate::cli::FetchArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::ingest;
use crate::output::OutputMode;

pub async fn run(ctx: &AppContext, args: FetchArgs) -> AppResult<()> {
    if args.limit == 0 {
        return Err(AppError::InvalidInput(
            "--limit must be greater than 0".to_string(),
        ));
    }

    let summaries = ingest::list_unread_and_summarize(&ctx.mail, args.limit).await?;
    ingest::write_export(&args.out, &summaries)?;

    if ctx.output.mode() == OutputMode::Text {
        if summaries.is_empty() {
            println!("0 unread messages; wrote {}", args.out.display());
            return Ok(());
        }

        for (index, summary) in summaries.iter().enumerate() {
            let from = summary.from.as_deref().unwrap_or("(unknown sender)");
            let to = summary.to.as_deref().unwrap_or("(unknown recipient)");
            let subject = summary.subject.as_deref().unwrap_or("(no subject)");
            let preview = ingest::format_preview(summary.snippet.as_deref());

            println!("{}. {}", index + 1, summary.id);
            println!("   from: {from}");
            println!("   to: {to}");
            println!("   subject: {subject}");
            println!();
            println!("   {preview}");

            if index + 1 < summaries.len() {
                println!();
            }
        }

        println!();
        println!("wrote {} rows to {}", summaries.len(), args.out.display());
        return Ok(());
    }

    let text = format!("{} unread messages", summaries.len());
    ctx.output.emit(&text, &summaries)
}
