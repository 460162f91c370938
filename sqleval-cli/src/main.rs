//! Command-line entry point for sqleval

use clap::Parser;
use sqleval_cli::commands::Commands;
use sqleval_cli::CliResult;

#[derive(Debug, Parser)]
#[command(name = "sqleval")]
#[command(version)]
#[command(about = "Score LLM-generated SQL results against expected results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
