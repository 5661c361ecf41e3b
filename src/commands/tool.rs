use crate::agent::{self, AgentRole, ToolSpec};
use crate::cli::{ToolCallArgs, ToolCommand};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::output::OutputMode;

pub async fn run(ctx: &AppContext, command: ToolCommand) -> AppResult<()> {
    match command {
        ToolCommand::Ls => list_tools(ctx),
        ToolCommand::Call(args) => call_tool(ctx, args).await,
    }
}

fn list_tools(ctx: &AppContext) -> AppResult<()> {
    if ctx.output.mode() == OutputMode::Text {
        for (index, spec) in agent::TOOL_TABLE.iter().enumerate() {
            let callers = spec
                .callers
                .iter()
                .map(AgentRole::as_str)
                .collect::<Vec<_>>()
                .join(", ");

            println!("{}", spec.name);
            println!("   {}", spec.description);
            println!("   callers: {callers}");
            println!("   executor: {}", spec.executor);

            if index + 1 < agent::TOOL_TABLE.len() {
                println!();
            }
        }
        return Ok(());
    }

    let listing = agent::TOOL_TABLE
        .iter()
        .map(tool_entry)
        .collect::<Vec<_>>();
    let text = format!("{} tools", listing.len());
    ctx.output.emit(&text, &listing)
}

fn tool_entry(spec: &ToolSpec) -> serde_json::Value {
    serde_json::json!({
        "name": spec.name,
        "description": spec.description,
        "callers": spec.callers,
        "executor": spec.executor,
        "parameters": (spec.parameters)(),
    })
}

async fn call_tool(ctx: &AppContext, args: ToolCallArgs) -> AppResult<()> {
    let caller: AgentRole = args.caller.parse()?;
    let tool_args: serde_json::Value = serde_json::from_str(&args.args)
        .map_err(|err| AppError::InvalidInput(format!("--args must be a JSON object: {err}")))?;

    let result = agent::invoke(&ctx.mail, caller, &args.name, tool_args).await?;

    let text = match &result {
        serde_json::Value::Null => format!("{}: no result", args.name),
        other => serde_json::to_string_pretty(other)?,
    };
    ctx.output.emit(&text, &result)
}
