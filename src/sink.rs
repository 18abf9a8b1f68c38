use na::Vector3;

use crate::{observation::Observation, types::Float, Result};

/// Host-side capability that receives the loads computed each step.
///
/// Offsets are measured from the body's centre of mass, in world frame.
pub trait ForceSink {
    fn apply_force(&mut self, force: &Vector3<Float>, offset: &Vector3<Float>);

    fn apply_impulse(&mut self, impulse: &Vector3<Float>, offset: &Vector3<Float>);
}

/// Host-side capability that persists one observation per step.
pub trait ObservationSink {
    /// Labels-addition trigger. The header is produced on the first call only;
    /// later calls just flush.
    fn add_labels(&mut self) -> Result<()>;

    fn add_observation(&mut self, observation: &Observation) -> Result<()>;
}

impl<S: ObservationSink + ?Sized> ObservationSink for &mut S {
    fn add_labels(&mut self) -> Result<()> {
        (**self).add_labels()
    }

    fn add_observation(&mut self, observation: &Observation) -> Result<()> {
        (**self).add_observation(observation)
    }
}

/// Keeps observations in memory. Useful when the caller post-processes the
/// run instead of writing it out.
#[derive(Debug, Default)]
pub struct ObservationBuffer {
    pub observations: Vec<Observation>,
    pub labels_added: usize,
}

impl ObservationSink for ObservationBuffer {
    fn add_labels(&mut self) -> Result<()> {
        self.labels_added += 1;
        Ok(())
    }

    fn add_observation(&mut self, observation: &Observation) -> Result<()> {
        self.observations.push(observation.clone());
        Ok(())
    }
}
