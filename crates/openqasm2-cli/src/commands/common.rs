//! Shared helpers for CLI commands.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use openqasm2::{Parser, ParserOptions};

/// Read circuit text from a file, or from stdin when `input` is `-`.
pub fn read_source(input: &str) -> Result<String> {
    if input == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        return Ok(source);
    }

    if !Path::new(input).exists() {
        anyhow::bail!("File not found: {input}");
    }

    fs::read_to_string(input).with_context(|| format!("Failed to read file: {input}"))
}

/// Load parser options from an optional YAML file. `--no-core` wins over the file.
pub fn load_options(config: Option<&str>, no_core: bool) -> Result<ParserOptions> {
    let mut options = match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {path}"))?;
            let options: ParserOptions = serde_yaml_ng::from_str(&text)
                .with_context(|| format!("Invalid config file: {path}"))?;
            debug!("Loaded parser options from {path}: {options:?}");
            options
        }
        None => ParserOptions::default(),
    };

    if no_core {
        options.core = false;
    }
    Ok(options)
}

/// Build a parser, preloading the standard library if requested.
pub fn build_parser(options: ParserOptions) -> Result<Parser> {
    Parser::new(options).context("Failed to initialise parser")
}
