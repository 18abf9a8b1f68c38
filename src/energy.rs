use na::Vector3;

use crate::{
    rigid_body::{BodyState, RigidBody},
    types::Float,
};

/// KE = 1/2 m v·v + 1/2 ω·(J ω), with J the world-frame moment about the
/// centre of mass
pub fn kinetic_energy(body: &RigidBody, state: &BodyState) -> Float {
    let v = &state.linear_velocity;
    let w = &state.angular_velocity;
    let J = body.moment_world(&state.rotation);

    0.5 * body.mass * v.dot(v) + 0.5 * w.dot(&(J * w))
}

/// PE = -m g·p, zero at the world origin
pub fn potential_energy(body: &RigidBody, state: &BodyState, gravity: &Vector3<Float>) -> Float {
    -body.mass * gravity.dot(&state.position)
}

/// Compute the total mechanical energy of a free body under uniform gravity
pub fn total_energy(body: &RigidBody, state: &BodyState, gravity: &Vector3<Float>) -> Float {
    kinetic_energy(body, state) + potential_energy(body, state, gravity)
}

#[cfg(test)]
mod energy_tests {
    use na::vector;

    use super::*;
    use crate::{assert_close, integrators::FreeBody, GRAVITY};

    fn benchmark_box() -> RigidBody {
        RigidBody::new_cuboid(10.0, 0.1, 0.4, 0.9)
    }

    #[test]
    fn simple_box_initial_energy() {
        // Arrange
        let body = benchmark_box();
        let mut state = BodyState::at_rest();
        state.linear_velocity = vector![-0.9, 0.4, 0.1];
        state.angular_velocity = vector![0.5, 0.0, 0.0];

        // Act
        let E = total_energy(&body, &state, &Vector3::zeros());

        // Assert
        assert_close!(E, 5.0010417, 1e-5);
    }

    #[test]
    fn complex_box_initial_energy() {
        let body = benchmark_box();
        let mut state = BodyState::at_rest();
        state.linear_velocity = vector![-2.0, 2.0, 8.0];
        state.angular_velocity = vector![0.1, 5.0, 0.1];

        let E = total_energy(&body, &state, &vector![0.0, 0.0, -GRAVITY]);

        assert_close!(E, 368.54641, 1e-3);
    }

    #[test]
    fn potential_energy_grows_with_height() {
        let body = benchmark_box();
        let gravity = vector![0.0, 0.0, -GRAVITY];
        let mut state = BodyState::at_rest();
        state.position = vector![3.0, -2.0, 2.0];

        let PE = potential_energy(&body, &state, &gravity);

        assert_close!(PE, 10.0 * GRAVITY * 2.0, 1e-4);
        assert_close!(kinetic_energy(&body, &state), 0.0, 1e-9);
    }

    #[test]
    fn free_fall_conserves_energy() {
        // Arrange
        let body = benchmark_box();
        let gravity = vector![0.0, 0.0, -GRAVITY];
        let mut host = FreeBody::new(body.clone(), gravity)
            .unwrap()
            .with_velocities(vector![1.0, 0.0, 5.0], vector![0.5, 0.0, 0.0]);
        let init_energy = total_energy(&body, &host.state(), &gravity);

        // Act
        let dt = 0.01;
        for _ in 0..200 {
            host.step(dt);
        }

        // Assert
        let final_energy = total_energy(&body, &host.state(), &gravity);
        assert_close!(final_energy, init_energy, 1e-2);
    }
}
