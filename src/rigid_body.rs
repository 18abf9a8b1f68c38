use na::{vector, Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{error::BenchError, types::Float, Result};

/// Mass properties of a single rigid body.
///
/// !!! Warning
///     The __moment__ field is the moment of inertia about the centre of mass,
///     expressed in the body frame.
#[derive(Clone, PartialEq, Debug)]
pub struct RigidBody {
    pub mass: Float,
    pub moment: Matrix3<Float>,
}

impl RigidBody {
    pub fn new(mass: Float, moment: Matrix3<Float>) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(BenchError::InvalidMass(mass));
        }
        Ok(RigidBody { mass, moment })
    }

    pub fn new_sphere(m: Float, r: Float) -> RigidBody {
        let moment_x = 2.0 / 5.0 * m * r * r;
        let moment = Matrix3::from_diagonal(&vector![moment_x, moment_x, moment_x]);
        RigidBody { mass: m, moment }
    }

    pub fn new_cube(m: Float, l: Float) -> RigidBody {
        let moment_x = m * l * l / 6.0;
        let moment = Matrix3::from_diagonal(&vector![moment_x, moment_x, moment_x]);
        RigidBody { mass: m, moment }
    }

    /// Solid box of uniform density with side lengths w (x), d (y), h (z).
    pub fn new_cuboid(m: Float, w: Float, d: Float, h: Float) -> RigidBody {
        let moment_x = m * (d * d + h * h) / 12.0;
        let moment_y = m * (w * w + h * h) / 12.0;
        let moment_z = m * (w * w + d * d) / 12.0;
        let moment = Matrix3::from_diagonal(&vector![moment_x, moment_y, moment_z]);
        RigidBody { mass: m, moment }
    }

    /// Moment of inertia about the centre of mass, expressed in world frame.
    /// J_world = R * J * R^T
    pub fn moment_world(&self, rotation: &UnitQuaternion<Float>) -> Matrix3<Float> {
        let R = rotation.to_rotation_matrix();
        R.matrix() * self.moment * R.matrix().transpose()
    }

    /// Angular momentum about the centre of mass, given world angular velocity.
    pub fn angular_momentum(
        &self,
        rotation: &UnitQuaternion<Float>,
        angular_velocity: &Vector3<Float>,
    ) -> Vector3<Float> {
        self.moment_world(rotation) * angular_velocity
    }
}

/// Serializable description of the primitive bodies used in the experiments.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape")]
pub enum BodyShape {
    Cuboid { mass: Float, size: [Float; 3] },
    Sphere { mass: Float, radius: Float },
}

impl Default for BodyShape {
    fn default() -> Self {
        BodyShape::Cuboid {
            mass: 1.0,
            size: [1.0, 1.0, 1.0],
        }
    }
}

impl BodyShape {
    pub fn build(&self) -> Result<RigidBody> {
        let body = match *self {
            BodyShape::Cuboid { mass, size } => {
                RigidBody::new_cuboid(mass, size[0], size[1], size[2])
            }
            BodyShape::Sphere { mass, radius } => RigidBody::new_sphere(mass, radius),
        };
        RigidBody::new(body.mass, body.moment)
    }
}

/// Kinematic snapshot of a body, as read from the host once per step.
/// All vectors are in world frame.
#[derive(Clone, PartialEq, Debug)]
pub struct BodyState {
    pub linear_velocity: Vector3<Float>,
    pub angular_velocity: Vector3<Float>,
    /// Centre of mass position
    pub position: Vector3<Float>,
    pub rotation: UnitQuaternion<Float>,
    pub angular_momentum: Vector3<Float>,
}

impl BodyState {
    pub fn at_rest() -> Self {
        BodyState {
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            angular_momentum: Vector3::zeros(),
        }
    }

    /// Orientation as (roll, yaw, pitch) in degrees, the column order of the
    /// observation logs.
    pub fn roll_yaw_pitch(&self) -> (Float, Float, Float) {
        let (roll, pitch, yaw) = self.rotation.euler_angles();
        (roll.to_degrees(), yaw.to_degrees(), pitch.to_degrees())
    }
}

#[cfg(test)]
mod rigid_body_tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::PI;

    #[test]
    fn benchmark_box_inertia() {
        // 10 kg box of 0.1 x 0.4 x 0.9 m
        let body = RigidBody::new_cuboid(10.0, 0.1, 0.4, 0.9);

        assert_relative_eq!(body.moment[(0, 0)], 0.80833333, epsilon = 1e-6);
        assert_relative_eq!(body.moment[(1, 1)], 0.68333333, epsilon = 1e-6);
        assert_relative_eq!(body.moment[(2, 2)], 0.14166667, epsilon = 1e-6);
    }

    #[test]
    fn cube_matches_cuboid() {
        let cube = RigidBody::new_cube(2.0, 0.5);
        let cuboid = RigidBody::new_cuboid(2.0, 0.5, 0.5, 0.5);
        assert_relative_eq!(cube.moment, cuboid.moment, epsilon = 1e-7);
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = RigidBody::new(0.0, Matrix3::identity()).unwrap_err();
        assert!(err.is_config_error());
        assert!(BodyShape::Sphere {
            mass: -1.0,
            radius: 1.0
        }
        .build()
        .is_err());
    }

    #[test]
    fn world_moment_follows_rotation() {
        // Arrange
        let body = RigidBody::new_cuboid(10.0, 0.1, 0.4, 0.9);
        let quarter_turn_z = UnitQuaternion::from_euler_angles(0.0, 0.0, PI / 2.0);

        // Act
        let J = body.moment_world(&quarter_turn_z);

        // Assert: x and y principal moments swap
        assert_relative_eq!(J[(0, 0)], body.moment[(1, 1)], epsilon = 1e-5);
        assert_relative_eq!(J[(1, 1)], body.moment[(0, 0)], epsilon = 1e-5);
        assert_relative_eq!(J[(2, 2)], body.moment[(2, 2)], epsilon = 1e-5);
    }

    #[test]
    fn roll_yaw_pitch_in_degrees() {
        let mut state = BodyState::at_rest();
        state.rotation = UnitQuaternion::from_euler_angles(PI / 2.0, 0.0, PI / 4.0);

        let (roll, yaw, pitch) = state.roll_yaw_pitch();
        assert_relative_eq!(roll, 90.0, epsilon = 1e-3);
        assert_relative_eq!(yaw, 45.0, epsilon = 1e-3);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-3);
    }
}
