use anyhow::Context;
use clap::{Parser, Subcommand};
use occupancy_grid::{codec, inspect, FileSystemStore, ViewConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

/// Occupancy grid converter and inspector
#[derive(Parser, Debug)]
#[command(name = "occgrid", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an .npz occupancy archive to a .bin payload + .json metadata
    Convert {
        /// Input .npz file path
        input: PathBuf,

        /// Output JSON file path (default: next to the input, same name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print statistics and derived views of an .npz occupancy archive
    Inspect {
        /// Input .npz file path
        input: PathBuf,

        /// Write the inspection report (JSON) to this path
        report: Option<PathBuf>,

        /// Histogram bin count
        #[arg(long, default_value_t = occupancy_grid::config::DEFAULT_HISTOGRAM_BINS)]
        bins: usize,
    },
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).compact().init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    let store = FileSystemStore::default();
    match command {
        Command::Convert { input, output } => {
            let report = codec::convert_file(&store, &input, output.as_deref())
                .with_context(|| format!("converting {}", input.display()))?;
            println!("{}", report.paths.metadata.display());
        }
        Command::Inspect {
            input,
            report,
            bins,
        } => {
            let config = ViewConfig::default().with_histogram_bins(bins);
            inspect::inspect_file(&store, &input, report.as_deref(), &config)
                .with_context(|| format!("inspecting {}", input.display()))?;
        }
    }
    Ok(())
}
