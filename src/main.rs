//! Estilizar CLI
//!
//! Training entry point for the estilizar library.
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! estilizar train config.yaml
//!
//! # Train with overrides
//! estilizar train config.yaml --updates 2000 --batch-size 8
//!
//! # Validate config
//! estilizar validate config.yaml
//!
//! # Show resolved config
//! estilizar info config.yaml
//! ```

use clap::{Parser, Subcommand};
use estilizar::train::{NonFiniteGuard, ProgressCallback, TrainOptions, TrainingOrchestrator};
use estilizar::{Error, Result};
use std::path::PathBuf;
use std::process::ExitCode;

/// Estilizar: multi-style neural style transfer training pipeline
#[derive(Parser, Debug)]
#[command(name = "estilizar")]
#[command(version)]
#[command(about = "Multi-style neural style transfer training pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress per-step progress output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a transfer network from a YAML configuration
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ConfigArgs),

    /// Display the resolved configuration
    Info(ConfigArgs),
}

#[derive(Parser, Debug)]
struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override number of parameter updates
    #[arg(long)]
    updates: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f32>,

    /// Random seed for the content shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Save a parameter snapshot every N updates
    #[arg(long)]
    snapshot_every: Option<usize>,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Train(args) => run_train(args, cli.quiet),
        Command::Validate(args) => run_validate(args),
        Command::Info(args) => run_info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_train(args: TrainArgs, quiet: bool) -> Result<()> {
    let mut options = TrainOptions::load_yaml(&args.config)?;
    if let Some(updates) = args.updates {
        options.num_parameter_updates = updates;
    }
    if let Some(batch_size) = args.batch_size {
        options.batch_size = batch_size;
    }
    if let Some(lr) = args.lr {
        options.lr = lr;
    }
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(interval) = args.snapshot_every {
        options.snapshot_interval = Some(interval);
        options.snapshot_final = true;
    }
    options.validate()?;

    let mut orchestrator = TrainingOrchestrator::new(options.clone());
    if !quiet {
        orchestrator.add_callback(ProgressCallback::new(options.log_interval));
    }
    if options.halt_on_non_finite {
        orchestrator.add_callback(NonFiniteGuard);
    }

    let report = orchestrator.run()?;

    println!(
        "Run {} finished: {} updates in {:.1}s",
        report.run_id, report.updates_completed, report.elapsed_secs
    );
    println!("Stats saved to {}", report.stats_path.display());
    if report.stopped_early {
        eprintln!("Run stopped before reaching the configured update budget");
    }
    Ok(())
}

fn run_validate(args: ConfigArgs) -> Result<()> {
    let options = TrainOptions::load_yaml(&args.config)?;
    options.validate()?;
    println!("Configuration OK ({} styles)", options.style_count());
    Ok(())
}

fn run_info(args: ConfigArgs) -> Result<()> {
    let options = TrainOptions::load_yaml(&args.config)?;
    let rendered = serde_yaml::to_string(&options)
        .map_err(|e| Error::Serialization(format!("YAML render failed: {e}")))?;
    print!("{rendered}");
    Ok(())
}
