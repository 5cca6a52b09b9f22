//! `qasm2` command-line interface
//!
//! Checks, inspects and formats `OpenQASM` 2.0 files.
//!
//! ```text
//! qasm2 check bell.qasm
//! qasm2 ast bell.qasm --pretty
//! qasm2 fmt bell.qasm -o bell.fmt.qasm
//! qasm2 eval "cos(theta)/2" --bind theta=0.5
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ast, check, common, eval, fmt, gates, version};

/// qasm2 - OpenQASM 2.0 checker and formatter
#[derive(Parser)]
#[command(name = "qasm2")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Do not preload the standard gate library (qelib1.inc)
    #[arg(long, global = true)]
    no_core: bool,

    /// Parser options file (YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a circuit
    Check {
        /// Input file, or `-` for stdin
        input: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the syntax tree as JSON
    Ast {
        /// Input file, or `-` for stdin
        input: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print a circuit in canonical form
    Fmt {
        /// Input file, or `-` for stdin
        input: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the preloaded gate signatures
    Gates,

    /// Evaluate a parameter expression
    Eval {
        /// Expression, e.g. `pi/4` or `cos(theta)`
        #[arg(allow_hyphen_values = true)]
        expr: String,

        /// Bind an identifier (NAME=VALUE); repeatable
        #[arg(short, long = "bind", value_name = "NAME=VALUE")]
        bind: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Logs go to stderr so command output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = common::load_options(cli.config.as_deref(), cli.no_core);

    // Execute command
    let result = options.and_then(|options| match cli.command {
        Commands::Check { input, json } => check::execute(&input, options, json),
        Commands::Ast { input, pretty } => ast::execute(&input, options, pretty),
        Commands::Fmt { input, output } => fmt::execute(&input, options, output.as_deref()),
        Commands::Gates => gates::execute(options),
        Commands::Eval { expr, bind } => eval::execute(&expr, &bind),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    });

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
