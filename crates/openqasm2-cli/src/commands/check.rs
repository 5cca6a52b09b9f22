//! Check command implementation.

use anyhow::Result;
use console::style;
use serde::Serialize;

use openqasm2::ParserOptions;

use super::common::{build_parser, read_source};

/// Summary of a valid circuit.
#[derive(Debug, Serialize)]
struct Summary {
    valid: bool,
    statements: usize,
    qubits: u64,
    clbits: u64,
    gate_calls: usize,
    gates_declared: usize,
}

/// Execute the check command.
pub fn execute(input: &str, options: ParserOptions, json: bool) -> Result<()> {
    let source = read_source(input)?;
    let parser = build_parser(options)?;

    let validated = match parser.parse_with_symbols(&source) {
        Ok(validated) => validated,
        Err(e) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&e.payload())?);
            }
            return Err(e.into());
        }
    };

    let summary = Summary {
        valid: true,
        statements: validated.program.len(),
        qubits: validated.symbols.num_qubits(),
        clbits: validated.symbols.num_clbits(),
        gate_calls: validated.program.gate_calls().count(),
        gates_declared: validated.symbols.num_gates(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {} is valid", style("✓").green().bold(), style(input).green());
    println!("  Statements: {}", summary.statements);
    println!("  Qubits: {}, Clbits: {}", summary.qubits, summary.clbits);
    println!("  Gate calls: {}", summary.gate_calls);
    if summary.gates_declared > 0 {
        println!("  Gates declared: {}", summary.gates_declared);
    }
    for path in validated.program.unresolved_includes() {
        println!(
            "  {} include \"{path}\" was not resolved",
            style("!").yellow().bold()
        );
    }

    Ok(())
}
