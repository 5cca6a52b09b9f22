//! Gates command implementation.

use anyhow::Result;
use console::style;

use openqasm2::ParserOptions;

use super::common::build_parser;

/// Execute the gates command.
pub fn execute(options: ParserOptions) -> Result<()> {
    let parser = build_parser(options)?;

    let Some(library) = parser.library() else {
        println!("Standard library disabled; no gates are preloaded.");
        return Ok(());
    };

    let gates = library.symbols.gates();
    println!(
        "{} {} preloaded gates:\n",
        style("qelib1.inc").cyan().bold(),
        gates.len()
    );
    println!("  {:<8} {:>6} {:>6}  {}", "NAME", "PARAMS", "QUBITS", "KIND");
    for (name, signature) in gates {
        let kind = if signature.opaque {
            style("opaque").yellow()
        } else {
            style("composite").dim()
        };
        println!(
            "  {:<8} {:>6} {:>6}  {}",
            style(name).bold(),
            signature.num_params,
            signature.num_qubits,
            kind
        );
    }

    Ok(())
}
