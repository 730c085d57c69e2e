//! rsm-frontier CLI - weighted-sum frontier tracing

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rsm_frontier::ProcessVariant;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

mod commands;

/// Trace the return/emissions trade-off of a fitted process model.
#[derive(Parser)]
#[command(name = "rsm-frontier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve anchors and sweep the weight grid
    Run {
        /// Process variant (standalone, integrated)
        #[arg(long)]
        variant: Option<ProcessVariant>,

        /// Number of equally spaced weights
        #[arg(long)]
        points: Option<usize>,

        /// JSON configuration file
        #[arg(short, long, env = "RSM_FRONTIER_CONFIG")]
        config: Option<PathBuf>,

        /// Output table (delimited text)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output report (JSON, includes anchors)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Solve weights in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Resolve and print the normalization anchors
    Anchors {
        /// Process variant (standalone, integrated)
        #[arg(long)]
        variant: Option<ProcessVariant>,

        /// JSON configuration file
        #[arg(short, long, env = "RSM_FRONTIER_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show the non-dominated subset of a frontier table
    Front {
        /// Input table written by `run`
        #[arg(short, long)]
        input: PathBuf,

        /// Field delimiter of the input table
        #[arg(long, default_value = ";")]
        delimiter: char,

        /// Dominance tolerance on both metrics
        #[arg(long, default_value = "1e-9")]
        tolerance: f64,
    },
}

/// Log to stderr; `--verbose` adds per-iteration solver output.
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
        .context("Failed to initialize logging")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Run {
            variant,
            points,
            config,
            output,
            report,
            parallel,
        } => {
            let overrides = commands::Overrides {
                variant,
                points,
                parallel,
            };
            commands::run::run(config, &overrides, output, report)
        }
        Commands::Anchors { variant, config } => {
            let overrides = commands::Overrides {
                variant,
                points: None,
                parallel: false,
            };
            commands::anchors::run(config, &overrides)
        }
        Commands::Front {
            input,
            delimiter,
            tolerance,
        } => commands::front::run(input, delimiter, tolerance),
    }
}
