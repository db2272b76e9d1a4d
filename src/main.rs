#![forbid(unsafe_code)]
//! Parity audit command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use parity::commands::{
    execute_diff, execute_run, execute_style, parse_index_arg, DiffOptions, RunOptions,
    StyleOptions,
};
use parity::config::{Config, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "parity")]
#[command(about = "Public-API parity audit between a Rust crate and its MoonBit port")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit coverage and write all reports
    Run {
        /// Rustdoc JSON for a crate, as CRATE=PATH (can specify multiple)
        #[arg(long = "index", value_parser = parse_index_arg)]
        indexes: Vec<(String, PathBuf)>,

        /// Generate rustdoc JSON with cargo before reading it
        #[arg(long)]
        build: bool,

        /// Reference workspace root
        #[arg(long)]
        reference_root: Option<PathBuf>,

        /// Port repository root
        #[arg(long)]
        port_root: Option<PathBuf>,

        /// Override table path
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify naming drift of mapped entries
    Style {
        /// Override table path
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show differences between two report files
    Diff {
        /// Previous report
        old: PathBuf,

        /// Current report
        new: PathBuf,

        /// Lines of context
        #[arg(short = 'U', long, default_value = "3")]
        context: usize,

        /// Exit with status 1 when the reports differ
        #[arg(long)]
        check: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "parity=debug" } else { "parity=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Run { indexes, build, reference_root, port_root, mapping, output } => {
            let options = RunOptions {
                indexes,
                build,
                reference_root,
                port_root,
                mapping,
                output,
            };
            execute_run(options, config)?;
        }

        Commands::Style { mapping, output } => {
            execute_style(StyleOptions { mapping, output }, config)?;
        }

        Commands::Diff { old, new, context, check } => {
            execute_diff(DiffOptions { old, new, context, check })?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", style("✗").red(), e);
        std::process::exit(1);
    }
}
