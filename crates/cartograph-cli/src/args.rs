//! Command-line argument definitions for the Cartograph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input workspace, where the summary
//! goes, configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Cartograph workspace tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the workspace file
    #[arg(help = "Path to the input workspace (.dsl)")]
    pub input: String,

    /// Path to write the summary to; stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
