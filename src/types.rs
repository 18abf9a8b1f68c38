/// Scalar used for forces, body state and energies.
pub type Float = f32;

/// Simulation clock, in seconds.
pub type Time = f64;
