//! Experiment loops. Each plays the role of the host's per-step tick callback:
//! evaluate, apply, step the body, record.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::{BenchmarkConfig, BoxScenario, ExperimentConfig},
    conservation::ConservationReference,
    driver::{ForceDriver, PatternClock},
    integrators::FreeBody,
    observation::Observation,
    recorder::LabelPolicy,
    rigid_body::BodyState,
    sink::ObservationSink,
    stats::{SignalStats, Vector3Stats},
    types::{Float, Time},
    Result,
};

/// Build the stand-in host an experiment configuration describes.
pub fn host_for(config: &ExperimentConfig) -> Result<FreeBody> {
    let body = config.body.build()?;
    FreeBody::new(body, config.gravity_vector())
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    /// Steps that produced an observation, i.e. after warm-up
    pub recorded: usize,
    pub peak_force: Float,
    /// Magnitude of the momentum delivered to the body, summed over steps
    pub impulse: Float,
    pub final_state: BodyState,
}

/// Drive `host` with the configured force pattern for the whole run.
///
/// Every step after warm-up is recorded with the state the body had before
/// that step's load. Under [`LabelPolicy::Streaming`] the labels trigger fires
/// at the start of the run; it always fires once more when the run is over.
pub fn run_force_pattern<S: ObservationSink>(
    config: &ExperimentConfig,
    host: &mut FreeBody,
    mut sink: S,
) -> Result<RunSummary> {
    config.validate()?;

    let dt = config.timestep;
    let steps = config.steps();
    let mut driver = ForceDriver::new(config.selector, config.domain, config.pattern)
        .with_application(config.application)
        .with_offset(config.offset_vector());
    let mut clock = PatternClock::new().with_warmup(config.warmup);

    info!(
        selector = config.selector,
        pattern = driver.pattern().map(|p| p.name()),
        domain = ?config.domain,
        steps,
        "starting force pattern run"
    );

    if config.label_policy == LabelPolicy::Streaming {
        sink.add_labels()?;
    }

    let mut recorded = 0;
    let mut peak_force: Float = 0.0;
    let mut impulse: Float = 0.0;
    for _ in 0..steps {
        let warming_up = clock.is_warming_up();
        let time = clock.pattern_time();
        let state = host.state();
        let load = driver.step(&mut clock, dt, host);

        if !warming_up {
            sink.add_observation(&Observation::new(time, state).with_force(load.force))?;
            recorded += 1;
        }

        peak_force = peak_force.max(load.force.norm());
        impulse += load.impulse.norm();

        host.step(dt);
        clock.advance(dt);
    }
    sink.add_labels()?;

    info!(recorded, peak_force, impulse, "force pattern run finished");
    Ok(RunSummary {
        steps,
        recorded,
        peak_force,
        impulse,
        final_state: host.state(),
    })
}

/// Max-abs error statistics and timing of one boxes benchmark run.
#[derive(Clone, Debug, Serialize)]
pub struct BoxesReport {
    pub scenario: BoxScenario,
    pub timestep: Time,
    pub steps: usize,
    pub sim_time: Time,
    pub wall_time: f64,
    pub time_ratio: f64,
    pub energy0: Float,
    pub angular_momentum0: Float,
    pub energy_error: SignalStats,
    pub angular_momentum_error: Vector3Stats,
    pub position_error: Vector3Stats,
    pub velocity_error: Vector3Stats,
}

/// Run the torque-free box benchmark and compare against the analytic
/// trajectory every step. The labels trigger fires before the first step.
pub fn run_boxes<S: ObservationSink>(config: &BenchmarkConfig, mut sink: S) -> Result<BoxesReport> {
    config.validate()?;

    let scenario = config.scenario;
    let dt = config.timestep;
    let steps = config.steps();
    let body = scenario.body();
    let gravity = scenario.gravity();

    let mut host = FreeBody::new(body.clone(), gravity)?
        .with_velocities(scenario.linear_velocity(), scenario.angular_velocity());
    let reference = ConservationReference::new(&body, &host.state(), &gravity)?;

    let energy0 = reference.initial_energy();
    let angular_momentum0 = reference.initial_angular_momentum().norm();
    info!(
        scenario = scenario.name(),
        dt,
        steps,
        energy0,
        angular_momentum0,
        "starting boxes benchmark"
    );

    let mut energy_error = SignalStats::new();
    let mut angular_momentum_error = Vector3Stats::new();
    let mut position_error = Vector3Stats::new();
    let mut velocity_error = Vector3Stats::new();

    sink.add_labels()?;
    let start = Instant::now();
    for i in 0..steps {
        host.step(dt);
        let t = (i + 1) as Time * dt;
        let state = host.state();
        let errors = reference.errors(&body, &state, t);

        energy_error.insert(errors.energy);
        angular_momentum_error.insert(&errors.angular_momentum);
        position_error.insert(&errors.position);
        velocity_error.insert(&errors.linear_velocity);

        sink.add_observation(&Observation::new(t, state).with_errors(errors, scenario.is_complex()))?;
    }
    sink.add_labels()?;
    let wall_time = start.elapsed().as_secs_f64();

    let sim_time = steps as Time * dt;
    let report = BoxesReport {
        scenario,
        timestep: dt,
        steps,
        sim_time,
        wall_time,
        time_ratio: wall_time / sim_time,
        energy0,
        angular_momentum0,
        energy_error,
        angular_momentum_error,
        position_error,
        velocity_error,
    };

    let drift = report.energy_error.max_abs();
    if drift.is_nan() {
        warn!("energy error became NaN, the run diverged");
    } else if drift > 1e-2 {
        warn!(max_abs = drift, "energy drifted more than 1% over the run");
    }
    debug!(?report, "boxes benchmark finished");
    Ok(report)
}
