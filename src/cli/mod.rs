//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Convert dbt test run artifacts into JUnit XML reports
#[derive(Parser, Debug)]
#[command(name = "dbt-junitxml", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert run results and manifest into a JUnit XML report
    Parse(ParseArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// dbt run results file
    #[arg(
        short = 'r',
        long,
        env = "DBT_RUN_RESULTS_PATH",
        default_value = "target/run_results.json"
    )]
    pub run_results: PathBuf,

    /// dbt manifest file
    #[arg(
        short = 'm',
        long,
        env = "DBT_MANIFEST_PATH",
        default_value = "target/manifest.json"
    )]
    pub manifest: PathBuf,

    /// Report output file
    #[arg(short = 'o', long, default_value = "report.xml")]
    pub output: PathBuf,

    /// Custom case properties, e.g. -p version=1.2 -p "Source=path_levels[1]"
    #[arg(short = 'p', long = "custom-properties", value_name = "KEY=VALUE")]
    pub custom_properties: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
