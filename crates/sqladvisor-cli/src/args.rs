//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sqladvisor")]
#[command(author, version, about = "SQL review tool for migration scripts")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Review SQL scripts against the configured rules
    Check {
        /// SQL files to check (supports glob patterns)
        files: Vec<PathBuf>,

        /// Path to a configuration file (defaults to sqladvisor.toml lookup)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Target database engine
        #[arg(short, long, env = "SQLADVISOR_ENGINE")]
        engine: Option<String>,

        /// Version reported by the target engine, e.g. 8.0.27 or 5.7.22-log
        #[arg(long = "engine-version", value_name = "VERSION")]
        engine_version: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Fail when a configured rule is not available for the engine
        #[arg(long)]
        strict: bool,
    },

    /// List the rules available for each engine
    Rules {
        /// Only list rules for this engine
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// Split a script into transactional and non-transactional statements
    Plan {
        /// SQL file to plan
        file: PathBuf,

        /// Target database engine
        #[arg(short, long, default_value = "mysql", env = "SQLADVISOR_ENGINE")]
        engine: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}
