//! Eval command implementation.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use openqasm2::parse_expression;

/// Parse `NAME=VALUE` pairs.
fn parse_bindings(bind: &[String]) -> Result<FxHashMap<String, f64>> {
    let mut bindings = FxHashMap::default();
    for pair in bind {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("Binding must be NAME=VALUE, got '{pair}'"))?;
        let value = parse_expression(value.trim())
            .with_context(|| format!("Invalid value for '{name}'"))?
            .as_f64()
            .with_context(|| format!("Value for '{name}' must be a constant"))?;
        bindings.insert(name.trim().to_string(), value);
    }
    Ok(bindings)
}

/// Execute the eval command.
pub fn execute(expr: &str, bind: &[String]) -> Result<()> {
    let bindings = parse_bindings(bind)?;
    let expression = parse_expression(expr)?;
    let value = expression.evaluate(&bindings)?;

    println!("{value}");
    Ok(())
}
