//! Run configuration for the force-pattern experiment and the boxes benchmark.
//!
//! Both configurations deserialize from JSON with every field optional, so a
//! file only needs to name what differs from the defaults.

use std::path::{Path, PathBuf};

use na::{vector, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    driver::{Application, Domain},
    error::BenchError,
    observation::Layout,
    pattern::PatternParams,
    recorder::LabelPolicy,
    rigid_body::{BodyShape, RigidBody},
    types::{Float, Time},
    Result, GRAVITY,
};

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

fn check_timestep(dt: Time) -> Result<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(BenchError::InvalidTimestep(dt));
    }
    if dt > 1.0 {
        return Err(BenchError::invalid_config(
            "timestep > 1 second is likely an error",
        ));
    }
    Ok(())
}

/// Configuration of a force-pattern experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Pattern selector, 0 to 4. Other values apply no force.
    pub selector: i64,
    pub domain: Domain,
    pub pattern: PatternParams,
    /// Fixed physics step (seconds).
    pub timestep: Time,
    /// Length of the run including warm-up (seconds).
    pub total_duration: Time,
    /// Initial period with no force and no recording (seconds).
    pub warmup: Time,
    pub application: Application,
    /// Point of application relative to the centre of mass.
    pub force_offset: [Float; 3],
    pub layout: Layout,
    pub label_policy: LabelPolicy,
    pub body: BodyShape,
    pub gravity: [Float; 3],
    pub output: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            selector: 0,
            domain: Domain::Time,
            pattern: PatternParams::default(),
            timestep: 0.001,
            total_duration: 7.0,
            warmup: 0.0,
            application: Application::Force,
            force_offset: [0.0; 3],
            layout: Layout::ForceLog,
            label_policy: LabelPolicy::Streaming,
            body: BodyShape::default(),
            // The stand-in host has no ground to rest on
            gravity: [0.0; 3],
            output: PathBuf::from("appliedForce.csv"),
        }
    }
}

impl ExperimentConfig {
    /// Settings of the game-engine cube variants: tick domain, half a second
    /// of warm-up, full kinematics with the applied force.
    #[must_use]
    pub fn tick_cube() -> Self {
        Self {
            domain: Domain::Ticks,
            warmup: 0.5,
            layout: Layout::KinematicsWithForce,
            label_policy: LabelPolicy::Deferred,
            output: PathBuf::from("Observations.csv"),
            ..Default::default()
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn selector(mut self, selector: i64) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    #[must_use]
    pub fn timestep(mut self, timestep: Time) -> Self {
        self.timestep = timestep;
        self
    }

    #[must_use]
    pub fn total_duration(mut self, total_duration: Time) -> Self {
        self.total_duration = total_duration;
        self
    }

    #[must_use]
    pub fn warmup(mut self, warmup: Time) -> Self {
        self.warmup = warmup;
        self
    }

    #[must_use]
    pub fn application(mut self, application: Application) -> Self {
        self.application = application;
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn gravity_vector(&self) -> Vector3<Float> {
        Vector3::from(self.gravity)
    }

    pub fn offset_vector(&self) -> Vector3<Float> {
        Vector3::from(self.force_offset)
    }

    /// Number of physics steps in the run.
    pub fn steps(&self) -> usize {
        (self.total_duration / self.timestep).ceil() as usize
    }

    pub fn validate(&self) -> Result<()> {
        check_timestep(self.timestep)?;

        if !self.total_duration.is_finite() || self.total_duration <= 0.0 {
            return Err(BenchError::invalid_config("total duration must be positive"));
        }
        if !self.warmup.is_finite() || self.warmup < 0.0 {
            return Err(BenchError::invalid_config("warm-up must be non-negative"));
        }
        if !self.pattern.duration.is_finite() || self.pattern.duration < 0.0 {
            return Err(BenchError::invalid_config(
                "pattern duration must be non-negative",
            ));
        }
        if self.layout == Layout::Conservation {
            return Err(BenchError::invalid_config(
                "conservation layout is only produced by the boxes benchmark",
            ));
        }

        self.body.build()?;
        Ok(())
    }
}

/// The two initial conditions of the boxes benchmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxScenario {
    /// No gravity, slow tumble about x.
    #[default]
    Simple,
    /// Gravity along -z, fast spin about the intermediate axis.
    Complex,
}

impl BoxScenario {
    pub fn name(&self) -> &'static str {
        match self {
            BoxScenario::Simple => "simple",
            BoxScenario::Complex => "complex",
        }
    }

    pub fn is_complex(&self) -> bool {
        *self == BoxScenario::Complex
    }

    /// 10 kg box of 0.1 x 0.4 x 0.9 m.
    pub fn body(&self) -> RigidBody {
        RigidBody::new_cuboid(10.0, 0.1, 0.4, 0.9)
    }

    pub fn gravity(&self) -> Vector3<Float> {
        match self {
            BoxScenario::Simple => Vector3::zeros(),
            BoxScenario::Complex => vector![0.0, 0.0, -GRAVITY],
        }
    }

    pub fn linear_velocity(&self) -> Vector3<Float> {
        match self {
            BoxScenario::Simple => vector![-0.9, 0.4, 0.1],
            BoxScenario::Complex => vector![-2.0, 2.0, 8.0],
        }
    }

    /// Initial angular velocity, world frame.
    pub fn angular_velocity(&self) -> Vector3<Float> {
        match self {
            BoxScenario::Simple => vector![0.5, 0.0, 0.0],
            BoxScenario::Complex => vector![0.1, 5.0, 0.1],
        }
    }
}

/// Configuration of a boxes conservation benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub scenario: BoxScenario,
    pub timestep: Time,
    pub duration: Time,
    /// Where to write the conservation log. Defaults to a name built from
    /// the scenario and timestep.
    pub output: Option<PathBuf>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            scenario: BoxScenario::Simple,
            timestep: 0.001,
            duration: 10.0,
            output: None,
        }
    }
}

impl BenchmarkConfig {
    #[must_use]
    pub fn new(scenario: BoxScenario) -> Self {
        Self {
            scenario,
            ..Default::default()
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn timestep(mut self, timestep: Time) -> Self {
        self.timestep = timestep;
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Time) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Number of physics steps needed to cover the duration.
    pub fn steps(&self) -> usize {
        (self.duration / self.timestep).ceil() as usize
    }

    /// e.g. `complex_test_0.001000.csv`
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!("{}_test_{:.6}.csv", self.scenario.name(), self.timestep))
        })
    }

    pub fn validate(&self) -> Result<()> {
        check_timestep(self.timestep)?;
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(BenchError::invalid_config("duration must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ExperimentConfig::default().validate().is_ok());
        assert!(ExperimentConfig::tick_cube().validate().is_ok());
        assert!(BenchmarkConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_timestep() {
        for dt in [0.0, -0.001, Time::NAN, Time::INFINITY] {
            let err = ExperimentConfig::default().timestep(dt).validate().unwrap_err();
            assert!(err.is_config_error());
            assert!(BenchmarkConfig::default().timestep(dt).validate().is_err());
        }
        assert!(ExperimentConfig::default().timestep(2.0).validate().is_err());
    }

    #[test]
    fn rejects_conservation_layout_for_experiments() {
        let config = ExperimentConfig::default().layout(Layout::Conservation);
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        // Arrange
        let config = ExperimentConfig::tick_cube()
            .selector(3)
            .application(Application::OneShotImpulse { scale: 0.5 })
            .output("cube.csv");

        // Act
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ExperimentConfig = serde_json::from_str(&json).unwrap();

        // Assert
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "selector": 4, "domain": "ticks", "pattern": { "constant_force": 5.0 } }"#;

        let config: ExperimentConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.selector, 4);
        assert_eq!(config.domain, Domain::Ticks);
        assert_eq!(config.pattern.constant_force, 5.0);
        assert_eq!(config.pattern.total_iterations, 5000);
        assert_eq!(config.timestep, 0.001);
    }

    #[test]
    fn benchmark_steps_and_output_name() {
        let config = BenchmarkConfig::new(BoxScenario::Complex);
        assert_eq!(config.steps(), 10000);
        assert_eq!(
            config.output_path(),
            PathBuf::from("complex_test_0.001000.csv")
        );

        let config = BenchmarkConfig::new(BoxScenario::Simple)
            .timestep(0.003)
            .duration(1.0);
        assert_eq!(config.steps(), 334);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BenchmarkConfig::from_json_file("/nonexistent/bench.json").unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }
}
