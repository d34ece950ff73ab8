//! ER Simulator CLI
//!
//! Run single ER simulations, a batch described by a JSON file, or the
//! built-in ten-run sweep over load and staffing levels.
//!
//! # Example
//!
//! ```bash
//! # One run with the default model (20 arrivals/hr, 3 doctors, 8 hours)
//! er-sim run
//!
//! # Override parameters on the command line
//! er-sim run --doctors 2 --arrival-rate 30 --seed 7 --output-dir runs/busy
//!
//! # Batch from a file, then the demonstration sweep
//! er-sim batch --config batch.json
//! RUST_LOG=er_simulator_core=debug er-sim sweep --no-export
//! ```

use clap::{Args, Parser, Subcommand};
use er_simulator_core::config::{BatchConfig, ErConfig};
use er_simulator_core::export::{write_batch_table, write_summary};
use er_simulator_core::{run_batch, RunResult, SimulationConfig, SimulationEngine};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Emergency room discrete-event simulator
#[derive(Parser, Debug)]
#[command(name = "er-sim")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulation
    Run(RunArgs),
    /// Run every entry of a batch config file
    Batch {
        /// Batch config (JSON: {"base": {...}, "runs": [{...}, ...]})
        #[arg(short, long)]
        config: PathBuf,

        /// Skip writing summary.csv files
        #[arg(long)]
        no_export: bool,
    },
    /// Run the built-in ten-run sweep
    Sweep {
        /// Base config supplying shift length and output root
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Skip writing summary.csv files
        #[arg(long)]
        no_export: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Config file; defaults are used when it does not exist
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Patient arrivals per hour
    #[arg(long)]
    arrival_rate: Option<f64>,

    /// Mean treatment time in minutes
    #[arg(long)]
    service_mean: Option<f64>,

    /// Number of doctors on shift
    #[arg(short, long)]
    doctors: Option<u32>,

    /// Simulated shift length in hours
    #[arg(long)]
    hours: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for summary.csv
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Skip writing summary.csv
    #[arg(long)]
    no_export: bool,
}

impl RunArgs {
    fn resolve(&self) -> CliResult<ErConfig> {
        let mut config = ErConfig::load_from_file(&self.config)?;
        if let Some(rate) = self.arrival_rate {
            config.arrival_rate_per_hour = rate;
        }
        if let Some(mean) = self.service_mean {
            config.service_mean_minutes = mean;
        }
        if let Some(doctors) = self.doctors {
            config.num_doctors = doctors;
        }
        if let Some(hours) = self.hours {
            config.sim_hours = hours;
        }
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,er_simulator_core=info,er_sim=info")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Run(args) => run_single(&args),
        Command::Batch { config, no_export } => BatchConfig::load_from_file(&config)
            .map_err(Into::into)
            .and_then(|batch| run_many(&batch, no_export)),
        Command::Sweep { config, no_export } => ErConfig::load_from_file(&config)
            .map_err(Into::into)
            .and_then(|base| run_many(&BatchConfig::demo_sweep(base), no_export)),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "er-sim failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_single(args: &RunArgs) -> CliResult<()> {
    let config = args.resolve()?.to_simulation_config();
    let result = SimulationEngine::new(config.clone())?.run()?;

    if !args.no_export {
        export(&config, &result)?;
    }

    println!("=== RUN SUMMARY ({}) ===", result.run_id);
    for (key, value) in result.summary.iter() {
        println!("{},{}", key, value);
    }
    println!("config_hash,{}", result.config_hash);
    println!("wall_seconds,{:.3}", result.wall_seconds);
    Ok(())
}

fn run_many(batch: &BatchConfig, no_export: bool) -> CliResult<()> {
    let configs = batch.simulation_configs()?;
    info!(runs = configs.len(), "Starting batch");

    let results = run_batch(&configs)?;
    if !no_export {
        for (config, result) in configs.iter().zip(&results) {
            export(config, result)?;
        }
    }

    println!("\n=== BATCH SUMMARY ===");
    write_batch_table(io::stdout().lock(), &configs, &results)?;
    Ok(())
}

fn export(config: &SimulationConfig, result: &RunResult) -> CliResult<()> {
    let dir = if config.output_dir.trim().is_empty() {
        PathBuf::from(&result.run_id)
    } else {
        PathBuf::from(&config.output_dir)
    };
    let path = write_summary(&dir, &result.summary)?;
    info!(run_id = %result.run_id, path = %path.display(), "Exported summary");
    Ok(())
}
