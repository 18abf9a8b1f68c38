use std::path::Path;

use plotters::prelude::*;

use crate::{
    driver::Domain,
    error::BenchError,
    pattern::{evaluate, Elapsed, ForcePattern, PatternParams},
    types::{Float, Time},
    Result,
};

/// y component of a pattern sampled once per step, starting at zero.
pub fn pattern_series(
    pattern: ForcePattern,
    domain: Domain,
    params: &PatternParams,
    dt: Time,
    num_steps: usize,
) -> Vec<Float> {
    (0..num_steps)
        .map(|i| {
            let elapsed = match domain {
                Domain::Time => Elapsed::Time(i as Time * dt),
                Domain::Ticks => Elapsed::Ticks(i as u64),
            };
            evaluate(pattern, elapsed, params).y
        })
        .collect()
}

fn plot_error(e: impl std::fmt::Display) -> BenchError {
    BenchError::Plot(e.to_string())
}

/// Line plot of `data` against time, one sample every `dt` seconds.
pub fn plot(data: &[Float], dt: Time, path: &Path, caption: &str) -> Result<()> {
    if data.is_empty() {
        return Err(BenchError::Plot("nothing to plot".to_string()));
    }

    // Determine y-axis limits based on the minimum and maximum values in the data
    let mut min_y = data.iter().cloned().fold(Float::INFINITY, Float::min);
    let mut max_y = data.iter().cloned().fold(Float::NEG_INFINITY, Float::max);
    if min_y == max_y {
        min_y -= 1.0;
        max_y += 1.0;
    }
    let final_time = (data.len() as Time * dt) as Float;

    let root = BitMapBackend::new(path, (640, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..final_time, min_y..max_y)
        .map_err(plot_error)?;

    chart.configure_mesh().draw().map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            data.iter()
                .enumerate()
                .map(|(i, y)| ((i as Time * dt) as Float, *y)),
            &BLUE,
        ))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}
