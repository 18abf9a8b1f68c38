//! Torque-free box benchmark: log state and conservation errors every step
//! and print max-abs statistics as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use physics_experiments::{
    config::{BenchmarkConfig, BoxScenario},
    observation::Layout,
    recorder::{CsvRecorder, LabelPolicy},
    simulate::run_boxes,
};

#[derive(Clone, Copy, ValueEnum)]
enum Scenario {
    Simple,
    Complex,
}

#[derive(Parser)]
#[command(name = "boxes")]
#[command(about = "Conservation benchmark of a free tumbling box", long_about = None)]
struct Cli {
    /// JSON benchmark configuration. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    scenario: Option<Scenario>,

    /// Physics step in seconds
    #[arg(long)]
    dt: Option<f64>,

    /// Simulated duration in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// CSV file to write, defaults to <scenario>_test_<dt>.csv
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BenchmarkConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BenchmarkConfig::default(),
    };
    if let Some(scenario) = cli.scenario {
        config.scenario = match scenario {
            Scenario::Simple => BoxScenario::Simple,
            Scenario::Complex => BoxScenario::Complex,
        };
    }
    if let Some(dt) = cli.dt {
        config = config.timestep(dt);
    }
    if let Some(duration) = cli.duration {
        config = config.duration(duration);
    }
    if let Some(output) = cli.output {
        config = config.output(output);
    }

    let path = config.output_path();
    let recorder = CsvRecorder::create(&path, Layout::Conservation, LabelPolicy::Streaming)?;
    let report = run_boxes(&config, recorder)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
