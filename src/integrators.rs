//! A single free rigid body that stands in for an engine-side physics body.
//!
//! It exists so that force patterns and conservation benchmarks can be driven
//! end to end without a game engine or robotics simulator attached. Linear
//! motion uses a constant-acceleration update, which is exact for loads that
//! are constant over a step. Rotation integrates Euler's equations in body
//! frame with explicit Euler, then the orientation quaternion with
//! [`quaternion_derivative`].

use na::{Matrix3, UnitQuaternion, Vector3};

use crate::{
    error::BenchError,
    rigid_body::{BodyState, RigidBody},
    sink::ForceSink,
    types::{Float, Time},
    util::quaternion_derivative,
    Result,
};

#[derive(Clone, Debug)]
pub struct FreeBody {
    pub body: RigidBody,
    pub gravity: Vector3<Float>,
    moment_inv: Matrix3<Float>,
    position: Vector3<Float>,
    linear_velocity: Vector3<Float>,
    rotation: UnitQuaternion<Float>,
    /// Angular velocity in body frame
    omega: Vector3<Float>,
    /// Loads accumulated for the next step, in world frame, about the centre of mass
    force: Vector3<Float>,
    torque: Vector3<Float>,
}

impl FreeBody {
    pub fn new(body: RigidBody, gravity: Vector3<Float>) -> Result<Self> {
        let moment_inv = body
            .moment
            .try_inverse()
            .ok_or_else(|| BenchError::invalid_config("moment of inertia must be invertible"))?;

        Ok(FreeBody {
            body,
            gravity,
            moment_inv,
            position: Vector3::zeros(),
            linear_velocity: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            omega: Vector3::zeros(),
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
        })
    }

    pub fn with_position(mut self, position: Vector3<Float>) -> Self {
        self.position = position;
        self
    }

    /// Set initial linear and angular velocity, both in world frame.
    pub fn with_velocities(mut self, linear: Vector3<Float>, angular: Vector3<Float>) -> Self {
        self.linear_velocity = linear;
        self.omega = self.rotation.inverse_transform_vector(&angular);
        self
    }

    pub fn state(&self) -> BodyState {
        let angular_velocity = self.rotation * self.omega;
        let angular_momentum = self.rotation * (self.body.moment * self.omega);
        BodyState {
            linear_velocity: self.linear_velocity,
            angular_velocity,
            position: self.position,
            rotation: self.rotation,
            angular_momentum,
        }
    }

    /// Advance by one step, consuming the loads accumulated since the last step.
    pub fn step(&mut self, dt: Time) {
        let dt = dt as Float;

        let a = self.gravity + self.force / self.body.mass;
        self.position += self.linear_velocity * dt + a * (0.5 * dt * dt);
        self.linear_velocity += a * dt;

        // J ω̇ = τ - ω × Jω, in body frame
        let J = &self.body.moment;
        let tau = self.rotation.inverse_transform_vector(&self.torque);
        let omega_dot = self.moment_inv * (tau - self.omega.cross(&(J * self.omega)));
        self.omega += omega_dot * dt;

        let qdot = quaternion_derivative(&self.rotation, &self.omega);
        self.rotation = UnitQuaternion::from_quaternion(self.rotation.into_inner() + qdot * dt);

        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }
}

impl ForceSink for FreeBody {
    fn apply_force(&mut self, force: &Vector3<Float>, offset: &Vector3<Float>) {
        self.force += force;
        self.torque += offset.cross(force);
    }

    fn apply_impulse(&mut self, impulse: &Vector3<Float>, offset: &Vector3<Float>) {
        self.linear_velocity += impulse / self.body.mass;
        let angular_impulse = self.rotation.inverse_transform_vector(&offset.cross(impulse));
        self.omega += self.moment_inv * angular_impulse;
    }
}

#[cfg(test)]
mod integrators_tests {
    use na::vector;

    use super::*;
    use crate::{assert_close, assert_vec_close, GRAVITY};

    fn unit_sphere() -> RigidBody {
        RigidBody::new_sphere(2.0, 0.5)
    }

    #[test]
    fn free_fall_matches_closed_form() {
        // Arrange
        let gravity = vector![0.0, 0.0, -GRAVITY];
        let v0 = vector![1.0, -2.0, 4.0];
        let p0 = vector![0.0, 0.0, 10.0];
        let mut host = FreeBody::new(unit_sphere(), gravity)
            .unwrap()
            .with_position(p0)
            .with_velocities(v0, Vector3::zeros());

        // Act
        let dt = 0.01;
        for _ in 0..100 {
            host.step(dt);
        }

        // Assert
        let t = 1.0;
        let expected_p = p0 + v0 * t + gravity * (0.5 * t * t);
        let expected_v = v0 + gravity * t;
        let state = host.state();
        assert_vec_close!(&state.position, &expected_p, 1e-3);
        assert_vec_close!(&state.linear_velocity, &expected_v, 1e-3);
    }

    #[test]
    fn applied_force_accelerates_once() {
        let mut host = FreeBody::new(unit_sphere(), Vector3::zeros()).unwrap();

        host.apply_force(&vector![0.0, 10.0, 0.0], &Vector3::zeros());
        host.step(0.1);
        host.step(0.1);

        // a = F / m = 5 for the first step only
        let state = host.state();
        assert_close!(state.linear_velocity.y, 0.5, 1e-6);
        assert_close!(state.position.y, 0.5 * 5.0 * 0.01 + 0.5 * 0.1, 1e-6);
    }

    #[test]
    fn offset_impulse_spins_the_body() {
        // Arrange
        let body = unit_sphere();
        let moment = body.moment[(0, 0)];
        let mut host = FreeBody::new(body, Vector3::zeros()).unwrap();

        // Act: push along +y at +x offset, spinning about +z
        host.apply_impulse(&vector![0.0, 1.0, 0.0], &vector![0.5, 0.0, 0.0]);

        // Assert
        let state = host.state();
        assert_close!(state.linear_velocity.y, 0.5, 1e-6);
        assert_close!(state.angular_velocity.z, 0.5 / moment, 1e-5);
        assert_close!(state.angular_momentum.z, 0.5, 1e-5);
    }

    #[test]
    fn torque_free_spin_about_principal_axis_is_steady() {
        let body = RigidBody::new_cuboid(10.0, 0.1, 0.4, 0.9);
        let mut host = FreeBody::new(body, Vector3::zeros())
            .unwrap()
            .with_velocities(Vector3::zeros(), vector![0.5, 0.0, 0.0]);
        let H0 = host.state().angular_momentum;

        for _ in 0..1000 {
            host.step(1e-3);
        }

        let state = host.state();
        assert_vec_close!(&state.angular_momentum, &H0, 1e-6);
        let (roll, _, _) = state.roll_yaw_pitch();
        assert_close!(roll, (0.5 as Float).to_degrees(), 1e-2);
    }

    #[test]
    fn singular_inertia_is_rejected() {
        let body = RigidBody {
            mass: 1.0,
            moment: Matrix3::zeros(),
        };
        assert!(FreeBody::new(body, Vector3::zeros()).is_err());
    }
}
