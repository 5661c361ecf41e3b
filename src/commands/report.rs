use crate::cli::ReportArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::report::{SqliteLogSource, generate_usage_report};

pub async fn run(ctx: &AppContext, args: ReportArgs) -> AppResult<()> {
    let source = SqliteLogSource::new(&args.db, &args.table)?;
    let report = generate_usage_report(&source)?;

    let text = format!(
        "total tokens for all sessions: {}, total cost: {:.4}",
        report.total_tokens, report.total_cost
    );
    ctx.output.emit(&text, &report)
}
