//! qasm2qs Command-Line Interface
//!
//! Translates `OpenQASM` 2 programs into Q# source files.
//!
//! ```text
//! qasm2qs translate -i bell.qasm                  # writes bell.qs
//! qasm2qs translate -i bell.qasm -o out/Bell.qs -n Quantum.Bell
//! QASM2QS_CONFIG=qasm2qs.yaml qasm2qs -v translate -i bell.qasm
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::translate::TranslateOptions;
use commands::{translate, version};

/// qasm2qs - OpenQASM 2 to Q# translator
#[derive(Parser)]
#[command(name = "qasm2qs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate an OpenQASM 2 file into Q#
    Translate {
        /// Input file (OpenQASM 2)
        #[arg(short, long)]
        input: String,

        /// Output file (defaults to the input with a .qs extension)
        #[arg(short, long)]
        output: Option<String>,

        /// Q# namespace (defaults to Quantum.<Stem>)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Name of the entry operation (defaults to the file stem)
        #[arg(long)]
        operation: Option<String>,

        /// Additional directory searched for include files
        #[arg(short = 'I', long = "include-path")]
        include_paths: Vec<String>,

        /// YAML translator configuration
        #[arg(short, long, env = "QASM2QS_CONFIG")]
        config: Option<String>,
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

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Translate {
            input,
            output,
            namespace,
            operation,
            include_paths,
            config,
        } => translate::execute(&TranslateOptions {
            input: &input,
            output: output.as_deref(),
            namespace: namespace.as_deref(),
            operation: operation.as_deref(),
            config: config.as_deref(),
            include_paths: &include_paths,
        })
        .map(|_| ()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
