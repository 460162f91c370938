//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;
use sqleval_core::METRICS;

use crate::output::OutputFormat;

pub mod batch;
pub mod compare;
pub mod compare_sql;
pub mod extract_sql;
pub mod generate_config;
pub mod merge;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score one produced result against the expected result
    Compare(compare::CompareArgs),

    /// Score many produced results against one expected result
    Batch(batch::BatchArgs),

    /// Merge *_METRICS.txt files into one CSV
    Merge(merge::MergeArgs),

    /// Extract the SQL statement from an LLM response
    ExtractSql(extract_sql::ExtractSqlArgs),

    /// Compare two SQL scripts textually
    CompareSql(compare_sql::CompareSqlArgs),

    /// Write a configuration template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Validate a configuration file
    Validate(validate::ValidateArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List reported metrics
    Metrics,

    /// List available output formats
    Formats,
}

impl Commands {
    /// Execute the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Compare(args) => args.execute(),
            Commands::Batch(args) => args.execute(),
            Commands::Merge(args) => args.execute(),
            Commands::ExtractSql(args) => args.execute(),
            Commands::CompareSql(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
            Commands::List { subcommand } => {
                subcommand.execute();
                Ok(())
            }
        }
    }
}

impl ListCommands {
    /// Print the requested listing
    pub fn execute(&self) {
        match self {
            ListCommands::Metrics => {
                println!("Reported metrics:");
                for (name, description) in METRICS {
                    println!("  {name:<18} {description}");
                }
            }
            ListCommands::Formats => {
                println!("Output formats:");
                for (_, name, description) in OutputFormat::ALL {
                    println!("  {name:<10} {description}");
                }
            }
        }
    }
}

/// Initialize logging based on verbosity level
pub(crate) fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if !quiet {
        // a logger may already be installed when commands run in-process
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .try_init();
    }
}
