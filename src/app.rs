use crate::cli::{Cli, Command};
use crate::commands;
use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(cli: Cli) -> AppResult<()> {
    let Cli {
        profile,
        json,
        verbose,
        command,
    } = cli;

    let ctx = AppContext::bootstrap(profile, json, verbose)?;

    match command {
        Command::Auth(args) => commands::auth::run(&ctx, args.command).await,
        Command::Fetch(args) => commands::fetch::run(&ctx, args).await,
        Command::Draft(args) => commands::draft::run(&ctx, args).await,
        Command::Tool(args) => commands::tool::run(&ctx, args.command).await,
        Command::Report(args) => commands::report::run(&ctx, args).await,
    }
}
