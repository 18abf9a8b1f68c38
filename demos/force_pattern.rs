//! Push a free cube with one of the five force patterns and log the applied
//! force (or full kinematics) to CSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use physics_experiments::{
    config::ExperimentConfig,
    driver::Domain,
    recorder::CsvRecorder,
    simulate::{host_for, run_force_pattern},
};

#[derive(Parser)]
#[command(name = "force_pattern")]
#[command(about = "Apply a scripted force pattern to a free cube", long_about = None)]
struct Cli {
    /// JSON experiment configuration. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pattern selector, 0 to 4
    #[arg(long)]
    selector: Option<i64>,

    /// Use the tick-based cube settings (warm-up, iteration counter)
    #[arg(long)]
    ticks: bool,

    /// Length of the run in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// CSV file to write
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None if cli.ticks => ExperimentConfig::tick_cube(),
        None => ExperimentConfig::default(),
    };
    if cli.ticks {
        config = config.domain(Domain::Ticks);
    }
    if let Some(selector) = cli.selector {
        config = config.selector(selector);
    }
    if let Some(duration) = cli.duration {
        config = config.total_duration(duration);
    }
    if let Some(output) = cli.output {
        config = config.output(output);
    }

    let mut host = host_for(&config)?;
    let recorder = CsvRecorder::create(&config.output, config.layout, config.label_policy)?;
    let summary = run_force_pattern(&config, &mut host, recorder)?;

    println!(
        "{} steps, {} recorded, peak force {:.3} N, impulse {:.3} N s -> {}",
        summary.steps,
        summary.recorded,
        summary.peak_force,
        summary.impulse,
        config.output.display()
    );
    Ok(())
}
