use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `exm` binary.
#[derive(Debug, Parser)]
#[command(name = "exm", version, about = "Examind - learning goals, exams and AI tutoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Page size for list commands (defaults to query.page_size)
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Page number for list commands
    #[arg(long, global = true, default_value_t = 1)]
    pub page: u32,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Seed the session cache from a snapshot written by `exm page --out`
    #[arg(long, global = true, value_name = "SNAPSHOT")]
    pub hydrate: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            page: self.page,
            quiet: self.quiet,
            verbose: self.verbose,
            hydrate: self.hydrate.clone(),
        }
    }
}
