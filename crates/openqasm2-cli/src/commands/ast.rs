//! AST command implementation.

use anyhow::Result;

use openqasm2::ParserOptions;

use super::common::{build_parser, read_source};

/// Execute the ast command.
pub fn execute(input: &str, options: ParserOptions, pretty: bool) -> Result<()> {
    let source = read_source(input)?;
    let program = build_parser(options)?.parse(&source)?;

    let json = if pretty {
        serde_json::to_string_pretty(&program)?
    } else {
        serde_json::to_string(&program)?
    };
    println!("{json}");

    Ok(())
}
