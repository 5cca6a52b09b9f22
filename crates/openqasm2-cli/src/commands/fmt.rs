//! Fmt command implementation.

use std::fs;

use anyhow::{Context, Result};
use console::style;

use openqasm2::{ParserOptions, emit};

use super::common::{build_parser, read_source};

/// Execute the fmt command.
pub fn execute(input: &str, options: ParserOptions, output: Option<&str>) -> Result<()> {
    let source = read_source(input)?;
    let program = build_parser(options)?.parse(&source)?;
    let formatted = emit(&program);

    match output {
        Some(path) => {
            fs::write(path, &formatted)
                .with_context(|| format!("Failed to write output: {path}"))?;
            println!(
                "{} Formatted {} statements to {}",
                style("✓").green().bold(),
                program.len(),
                style(path).green()
            );
        }
        None => print!("{formatted}"),
    }

    Ok(())
}
