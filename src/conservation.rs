//! Deviation of a simulated free body from its analytic trajectory.
//!
//! Under uniform gravity and no applied load after the initial conditions are
//! set, a rigid body must satisfy
//!
//! ```text
//! v(t) = v0 + g t
//! p(t) = p0 + v0 t + 1/2 g t^2
//! H(t) = H0
//! E(t) = E0
//! ```
//!
//! The functions here measure how far a host's state is from those
//! predictions. Momentum and energy are reported relative to their initial
//! magnitude, which is undefined for a zero reference: those cases surface as
//! [`BenchError::ZeroReference`] instead of a NaN.

use na::Vector3;

use crate::{
    energy::total_energy,
    error::BenchError,
    rigid_body::{BodyState, RigidBody},
    types::{Float, Time},
    Result,
};

/// v - (v0 + g t)
pub fn linear_velocity_error(
    v: &Vector3<Float>,
    v0: &Vector3<Float>,
    gravity: &Vector3<Float>,
    t: Float,
) -> Vector3<Float> {
    v - (v0 + gravity * t)
}

/// p - (p0 + v0 t + 1/2 g t^2)
pub fn position_error(
    p: &Vector3<Float>,
    p0: &Vector3<Float>,
    v0: &Vector3<Float>,
    gravity: &Vector3<Float>,
    t: Float,
) -> Vector3<Float> {
    p - (p0 + v0 * t + gravity * (0.5 * t * t))
}

/// (H - H0) / |H0|
pub fn angular_momentum_error(H: &Vector3<Float>, H0: &Vector3<Float>) -> Result<Vector3<Float>> {
    let H0_norm = H0.norm();
    if H0_norm == 0.0 {
        return Err(BenchError::ZeroReference {
            quantity: "angular momentum",
        });
    }
    Ok((H - H0) / H0_norm)
}

/// (E - E0) / E0
pub fn energy_error(E: Float, E0: Float) -> Result<Float> {
    if E0 == 0.0 {
        return Err(BenchError::ZeroReference { quantity: "energy" });
    }
    Ok((E - E0) / E0)
}

/// All error terms for one step.
#[derive(Clone, Debug, PartialEq)]
pub struct ConservationErrors {
    pub linear_velocity: Vector3<Float>,
    pub position: Vector3<Float>,
    pub angular_momentum: Vector3<Float>,
    pub energy: Float,
    /// Energy the error was computed from, kept for logging
    pub total_energy: Float,
}

/// Initial conditions captured at the start of a benchmark run.
#[derive(Clone, Debug, PartialEq)]
pub struct ConservationReference {
    v0: Vector3<Float>,
    p0: Vector3<Float>,
    H0: Vector3<Float>,
    H0_norm: Float,
    E0: Float,
    gravity: Vector3<Float>,
}

impl ConservationReference {
    /// Capture the reference from the first snapshot of a run.
    ///
    /// Fails if the initial angular momentum or the initial energy is zero,
    /// since the relative errors are undefined for the whole run then.
    pub fn new(body: &RigidBody, initial: &BodyState, gravity: &Vector3<Float>) -> Result<Self> {
        let H0 = initial.angular_momentum;
        let H0_norm = H0.norm();
        if H0_norm == 0.0 {
            return Err(BenchError::ZeroReference {
                quantity: "angular momentum",
            });
        }

        let E0 = total_energy(body, initial, gravity);
        if E0 == 0.0 {
            return Err(BenchError::ZeroReference { quantity: "energy" });
        }

        Ok(ConservationReference {
            v0: initial.linear_velocity,
            p0: initial.position,
            H0,
            H0_norm,
            E0,
            gravity: *gravity,
        })
    }

    pub fn initial_energy(&self) -> Float {
        self.E0
    }

    pub fn initial_angular_momentum(&self) -> &Vector3<Float> {
        &self.H0
    }

    /// Error terms at time t after the reference snapshot.
    pub fn errors(&self, body: &RigidBody, state: &BodyState, t: Time) -> ConservationErrors {
        let t = t as Float;
        let E = total_energy(body, state, &self.gravity);

        ConservationErrors {
            linear_velocity: linear_velocity_error(
                &state.linear_velocity,
                &self.v0,
                &self.gravity,
                t,
            ),
            position: position_error(&state.position, &self.p0, &self.v0, &self.gravity, t),
            angular_momentum: (state.angular_momentum - self.H0) / self.H0_norm,
            energy: (E - self.E0) / self.E0,
            total_energy: E,
        }
    }
}

#[cfg(test)]
mod conservation_tests {
    use na::vector;

    use super::*;
    use crate::{
        assert_close, assert_vec_close, integrators::FreeBody, util::test_utils::random_vector,
        GRAVITY,
    };

    #[test]
    fn exact_trajectory_has_no_error() {
        // Arrange
        let mut rng = rand::rng();
        let gravity = vector![0.0, 0.0, -GRAVITY];
        let v0 = random_vector(&mut rng, 5.0);
        let p0 = random_vector(&mut rng, 5.0);
        let t = 1.5;

        // Act
        let v = v0 + gravity * t;
        let p = p0 + v0 * t + gravity * (0.5 * t * t);

        // Assert
        let zero = Vector3::<Float>::zeros();
        assert_vec_close!(&linear_velocity_error(&v, &v0, &gravity, t), &zero, 1e-5);
        assert_vec_close!(&position_error(&p, &p0, &v0, &gravity, t), &zero, 1e-5);
    }

    #[test]
    fn relative_errors_are_normalized_by_reference() {
        let H0 = vector![3.0, 0.0, 4.0];
        let H = vector![3.5, 0.0, 4.0];
        let err = angular_momentum_error(&H, &H0).unwrap();
        assert_vec_close!(&err, &vector![0.1, 0.0, 0.0], 1e-7);

        assert_close!(energy_error(11.0, 10.0).unwrap(), 0.1, 1e-6);
        assert_close!(energy_error(-11.0, -10.0).unwrap(), 0.1, 1e-6);
    }

    #[test]
    fn zero_references_are_reported() {
        let err = angular_momentum_error(&vector![1.0, 0.0, 0.0], &Vector3::zeros()).unwrap_err();
        assert!(err.is_zero_reference());

        let err = energy_error(1.0, 0.0).unwrap_err();
        assert!(err.is_zero_reference());
    }

    #[test]
    fn reference_rejects_body_without_spin() {
        let body = RigidBody::new_cube(1.0, 1.0);
        let mut state = BodyState::at_rest();
        state.linear_velocity = vector![1.0, 0.0, 0.0];

        let err = ConservationReference::new(&body, &state, &Vector3::zeros()).unwrap_err();
        assert!(err.is_zero_reference());
    }

    #[test]
    fn free_fall_stays_on_analytic_trajectory() {
        // Arrange
        let body = RigidBody::new_cuboid(10.0, 0.1, 0.4, 0.9);
        let gravity = vector![0.0, 0.0, -GRAVITY];
        let v0 = vector![-2.0, 2.0, 8.0];
        let mut host = FreeBody::new(body.clone(), gravity)
            .unwrap()
            .with_velocities(v0, vector![0.5, 0.0, 0.0]);
        let reference = ConservationReference::new(&body, &host.state(), &gravity).unwrap();

        // Act
        let dt = 0.01;
        let steps = 100;
        let mut worst_position: Float = 0.0;
        let mut worst_velocity: Float = 0.0;
        let mut worst_energy: Float = 0.0;
        for i in 1..=steps {
            host.step(dt);
            let t = i as Time * dt;
            let errors = reference.errors(&body, &host.state(), t);

            let displacement = (v0 * t as Float + gravity * (0.5 * (t * t) as Float)).norm();
            let speed = (v0 + gravity * t as Float).norm();
            worst_position = worst_position.max(errors.position.norm() / displacement);
            worst_velocity = worst_velocity.max(errors.linear_velocity.norm() / speed.max(1.0));
            worst_energy = worst_energy.max(errors.energy.abs());
        }

        // Assert
        assert!(worst_position < 1e-3, "position error {}", worst_position);
        assert!(worst_velocity < 1e-3, "velocity error {}", worst_velocity);
        assert!(worst_energy < 1e-3, "energy error {}", worst_energy);
    }
}
