//! Per-step observation rows and the CSV column layouts of each experiment.

use itertools::Itertools;
use na::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    conservation::ConservationErrors,
    error::BenchError,
    rigid_body::BodyState,
    types::{Float, Time},
    Result,
};

/// Column layout of an observation log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Simulation time and applied force only.
    #[default]
    ForceLog,
    /// Velocity, position, orientation and angular velocity.
    Kinematics,
    /// [`Layout::Kinematics`] followed by the applied force.
    KinematicsWithForce,
    /// Time and linear velocity.
    Velocity,
    /// State and error terms of the conservation benchmark.
    Conservation,
}

fn xyz(label: &str) -> [String; 3] {
    ["X", "Y", "Z"].map(|axis| format!("{} {}", axis, label))
}

impl Layout {
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![];
        match self {
            Layout::ForceLog => {
                columns.extend(
                    ["sim_time", "applied_force_x", "applied_force_y", "applied_force_z"]
                        .map(String::from),
                );
            }
            Layout::Kinematics | Layout::KinematicsWithForce => {
                columns.push("Time".to_string());
                columns.extend(xyz("Velocity"));
                columns.extend(xyz("Position"));
                columns.extend(["Roll", "Yaw", "Pitch"].map(String::from));
                columns.extend(xyz("Angular Velocity"));
                if *self == Layout::KinematicsWithForce {
                    columns.extend(xyz("Force Applied"));
                }
            }
            Layout::Velocity => {
                columns.push("Time".to_string());
                columns.extend(xyz("Velocity"));
            }
            Layout::Conservation => {
                columns.extend(["Time", "IsComplex"].map(String::from));
                columns.extend(xyz("Velocity"));
                columns.extend(xyz("Velocity Error"));
                columns.extend(xyz("Position"));
                columns.extend(xyz("Position Error"));
                columns.extend(xyz("Angular Momentum"));
                columns.extend(xyz("Angular Momentum Error"));
                columns.extend(xyz("Angular Velocity"));
                columns.extend(["Energy", "Energy Error", "Roll", "Yaw", "Pitch"].map(String::from));
            }
        }
        columns
    }

    /// Header line. Only the force log header has a space after each comma;
    /// its data rows do not.
    pub fn header(&self) -> String {
        let separator = match self {
            Layout::ForceLog => ", ",
            _ => ",",
        };
        self.columns().iter().join(separator)
    }

    /// One data row, comma separated.
    pub fn row(&self, observation: &Observation) -> Result<String> {
        Ok(observation.values(*self)?.iter().join(","))
    }
}

/// Everything that may be logged about one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub time: Time,
    pub state: BodyState,
    pub applied_force: Vector3<Float>,
    pub errors: Option<ConservationErrors>,
    /// Whether the run has gravity pointing down, the benchmark's complex case
    pub is_complex: bool,
}

impl Observation {
    pub fn new(time: Time, state: BodyState) -> Self {
        Observation {
            time,
            state,
            applied_force: Vector3::zeros(),
            errors: None,
            is_complex: false,
        }
    }

    pub fn with_force(mut self, force: Vector3<Float>) -> Self {
        self.applied_force = force;
        self
    }

    pub fn with_errors(mut self, errors: ConservationErrors, is_complex: bool) -> Self {
        self.errors = Some(errors);
        self.is_complex = is_complex;
        self
    }

    /// Cell values in the column order of `layout`.
    pub fn values(&self, layout: Layout) -> Result<Vec<String>> {
        let s = &self.state;
        let mut values = vec![self.time.to_string()];
        let push3 = |values: &mut Vec<String>, v: &Vector3<Float>| {
            values.extend(v.iter().map(|x| x.to_string()));
        };
        let (roll, yaw, pitch) = s.roll_yaw_pitch();

        match layout {
            Layout::ForceLog => push3(&mut values, &self.applied_force),
            Layout::Kinematics | Layout::KinematicsWithForce => {
                push3(&mut values, &s.linear_velocity);
                push3(&mut values, &s.position);
                values.extend([roll, yaw, pitch].map(|x| x.to_string()));
                push3(&mut values, &s.angular_velocity);
                if layout == Layout::KinematicsWithForce {
                    push3(&mut values, &self.applied_force);
                }
            }
            Layout::Velocity => push3(&mut values, &s.linear_velocity),
            Layout::Conservation => {
                let e = self.errors.as_ref().ok_or_else(|| {
                    BenchError::invalid_config("conservation layout needs error terms")
                })?;
                values.push(if self.is_complex { "1" } else { "0" }.to_string());
                push3(&mut values, &s.linear_velocity);
                push3(&mut values, &e.linear_velocity);
                push3(&mut values, &s.position);
                push3(&mut values, &e.position);
                push3(&mut values, &s.angular_momentum);
                push3(&mut values, &e.angular_momentum);
                push3(&mut values, &s.angular_velocity);
                values.push(e.total_energy.to_string());
                values.push(e.energy.to_string());
                values.extend([roll, yaw, pitch].map(|x| x.to_string()));
            }
        }
        Ok(values)
    }
}
