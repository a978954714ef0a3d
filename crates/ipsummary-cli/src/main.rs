//! ipsummary CLI - command-line front-end for the contract extraction pipeline.

use clap::Parser;
use ipsummary_cli::{commands, Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => commands::execute_run(args, &cli.config).await?,
        Command::Aggregate(args) => commands::execute_aggregate(args, &cli.config)?,
        Command::ExportDb(args) => commands::execute_export_db(args, &cli.config)?,
        Command::Move(args) => commands::execute_move(args, &cli.config)?,
        Command::Task(args) => commands::execute_task(args)?,
    }
    Ok(())
}
