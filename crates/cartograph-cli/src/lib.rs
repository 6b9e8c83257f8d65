//! Cartograph CLI library
//!
//! This module contains the core CLI logic for the Cartograph workspace
//! tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io::Write};

use log::{info, warn};

use cartograph::{CartographError, WorkspaceLoader};

/// Run the Cartograph CLI application
///
/// This function loads the input workspace, reports any warnings raised
/// while interpreting it, and writes a summary of the resulting model and
/// views to the output file, or to stdout when no output is given.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CartographError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
pub fn run(args: &Args) -> Result<(), CartographError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing workspace"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let loader = WorkspaceLoader::new(app_config);
    let parsed = loader.load(&args.input)?;
    for warning in parsed.warnings() {
        warn!("{warning}");
    }

    let summary = loader.render_summary(parsed.workspace());
    match &args.output {
        Some(output) => {
            fs::write(output, summary)?;
            info!(output_file = output; "Summary written");
        }
        None => std::io::stdout().write_all(summary.as_bytes())?,
    }

    Ok(())
}
