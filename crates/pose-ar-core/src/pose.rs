//! Rigid board-to-camera transform.

use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid transform from the board frame into the camera frame:
/// `p_cam = R * p_board + t`.
///
/// The rotation is orthonormal with determinant +1 by construction. A pose
/// is frame-scoped: solvers produce a fresh one per frame and nothing in
/// this workspace carries a pose across frames.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl Pose {
    pub fn new(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Identity pose: board frame coincides with the camera frame.
    pub fn identity() -> Self {
        Self::new(Rotation3::identity(), Vector3::zeros())
    }

    /// Build a pose from an axis-angle rotation vector and a translation.
    ///
    /// The rotation vector's direction is the rotation axis and its norm the
    /// angle in radians, so the rotation matrix is reconstructed from a
    /// minimal three-parameter encoding.
    pub fn from_axis_angle(rvec: &Vector3<f64>, tvec: &Vector3<f64>) -> Self {
        Self::new(Rotation3::new(*rvec), *tvec)
    }

    /// Axis-angle encoding of the rotation (inverse of [`Pose::from_axis_angle`]).
    pub fn axis_angle(&self) -> Vector3<f64> {
        self.rotation.scaled_axis()
    }

    /// Map a board-frame point into the camera frame.
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.rotation * p + self.translation
    }

    /// Camera position expressed in the board frame: `-R^T * t`.
    pub fn camera_position(&self) -> Vector3<f64> {
        -(self.rotation.transpose() * self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_pose_puts_the_camera_at_the_origin() {
        let pos = Pose::identity().camera_position();
        assert_eq!(pos, Vector3::zeros());
    }

    #[test]
    fn pure_translation_flips_sign() {
        let pose = Pose::new(Rotation3::identity(), Vector3::new(0.0, 0.0, 5.0));
        let pos = pose.camera_position();
        assert_relative_eq!(pos.x, 0.0);
        assert_relative_eq!(pos.y, 0.0);
        assert_relative_eq!(pos.z, -5.0);
    }

    #[test]
    fn axis_angle_round_trips() {
        let rvec = Vector3::new(0.2, -0.1, 0.4);
        let tvec = Vector3::new(0.3, 0.1, 1.2);
        let pose = Pose::from_axis_angle(&rvec, &tvec);
        let back = pose.axis_angle();
        assert_relative_eq!(back.x, rvec.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, rvec.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, rvec.z, epsilon = 1e-12);
    }

    #[test]
    fn rotation_stays_orthonormal() {
        let pose = Pose::from_axis_angle(&Vector3::new(0.5, 0.7, -0.3), &Vector3::zeros());
        let r = pose.rotation.matrix();
        let should_be_identity = r.transpose() * r;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(should_be_identity[(i, j)], expected, epsilon = 1e-12);
            }
        }
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn camera_position_inverts_the_transform() {
        let pose = Pose::from_axis_angle(
            &Vector3::new(0.1, 0.2, -0.3),
            &Vector3::new(0.4, -0.2, 1.5),
        );
        let cam_in_board = Point3::from(pose.camera_position());
        let back = pose.transform_point(&cam_in_board);
        assert_relative_eq!(back.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(back.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(back.z, 0.0, epsilon = 1e-12);
    }
}
