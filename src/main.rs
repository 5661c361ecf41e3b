use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = triage::cli::Cli::parse();
    triage::init_tracing(cli.verbose);

    if let Err(err) = triage::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
