use na::{Matrix4x3, Quaternion, UnitQuaternion};
use nalgebra::Vector3;

use crate::types::Float;

/// Compute the derivative of quaternion, given angular velocity:
/// qdot = 1/2 * q \quaternion_product ω,
/// where q is orientation as quaternion, and ω is angular velocity in body frame
///
/// Ref: 1.5.2 & 1.5.4 in Quaternions and Dynamics, Basile Graf, 2007
pub fn quaternion_derivative(
    q: &UnitQuaternion<Float>,
    omega: &Vector3<Float>,
) -> Quaternion<Float> {
    let w = q.w;
    let x = q.coords.x;
    let y = q.coords.y;
    let z = q.coords.z;

    #[rustfmt::skip]
    let mat = Matrix4x3::new(
        -x, -y, -z,
         w, -z,  y,
         z,  w, -x,
        -y,  x,  w,
    ) / 2.0;

    let quaternion_dot = mat * omega;
    Quaternion::new(
        quaternion_dot[0],
        quaternion_dot[1],
        quaternion_dot[2],
        quaternion_dot[3],
    )
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        let diff = (left - right).abs();
        if diff > tol {
            panic!(
                "assertion failed: {} ~= {} \
                (tolerance: {}, difference: {})",
                left, right, tol, diff
            );
        }
    };
}

#[macro_export]
macro_rules! assert_vec_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        for (a, b) in left.iter().zip(right.iter()) {
            $crate::assert_close!(a, b, tol);
        }
    };
}

#[cfg(test)]
pub mod test_utils {
    use na::{vector, Vector3};
    use rand::{rngs::ThreadRng, Rng};

    use crate::types::Float;

    /// Build a Vector3 where each element is random between (-range, range)
    pub fn random_vector(rng: &mut ThreadRng, range: Float) -> Vector3<Float> {
        vector![
            rng.random_range(-range..range),
            rng.random_range(-range..range),
            rng.random_range(-range..range)
        ]
    }
}

#[cfg(test)]
mod util_tests {
    use na::vector;

    use super::*;

    #[test]
    fn quaternion_derivative_about_single_axis() {
        // Rotation about x only moves the w and x components
        let q = UnitQuaternion::from_euler_angles(0.3, 0.0, 0.0);
        let qdot = quaternion_derivative(&q, &vector![2.0, 0.0, 0.0]);

        assert_close!(qdot.w, -q.coords.x, 1e-6);
        assert_close!(qdot.i, q.w, 1e-6);
        assert_eq!(qdot.j, 0.0);
        assert_eq!(qdot.k, 0.0);
    }
}
