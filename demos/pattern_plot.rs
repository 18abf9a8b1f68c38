//! Render every force pattern to a PNG for a quick visual check.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use physics_experiments::{
    driver::Domain,
    pattern::{ForcePattern, PatternParams},
    plot::{pattern_series, plot},
};

#[derive(Parser)]
#[command(name = "pattern_plot")]
#[command(about = "Plot the force patterns", long_about = None)]
struct Cli {
    /// Directory the images are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Evaluate against the tick counter instead of time
    #[arg(long)]
    ticks: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let domain = if cli.ticks { Domain::Ticks } else { Domain::Time };
    let params = PatternParams::default();
    let dt = 0.001;
    let num_steps = 6000;

    for pattern in ForcePattern::ALL {
        let data = pattern_series(pattern, domain, &params, dt, num_steps);
        let path = cli
            .out_dir
            .join(format!("pattern_{}.png", pattern.selector()));
        plot(&data, dt, &path, pattern.name())?;
        println!("{}", path.display());
    }
    Ok(())
}
