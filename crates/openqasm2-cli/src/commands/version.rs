//! Version command implementation.

use console::style;

use openqasm2::QELIB1_PATH;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - OpenQASM 2.0 checker and formatter",
        style("qasm2").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  openqasm2      Lexer, parser and semantic validator");
    println!("  openqasm2-cli  Command-line interface");
    println!();
    println!("Language:   OpenQASM 2.0 (bundled {QELIB1_PATH})");
    println!("License:    {}", style("Apache-2.0").dim());
}
