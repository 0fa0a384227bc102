//! The PnP entry point: validation, initialization, refinement.

use log::debug;
use nalgebra::{Point2, Point3};

use pose_ar_core::{CameraModel, Pose};

use crate::dlt::dlt_pose;
use crate::homography::estimate_homography;
use crate::planar::pose_from_homography;
use crate::refine::{refine_pose, RefineOptions};
use crate::PnpError;

/// Test whether the object points all lie on the z = 0 board plane.
fn is_planar(object: &[Point3<f64>]) -> bool {
    let mut xy_extent = 0.0_f64;
    let mut max_z = 0.0_f64;
    for p in object {
        xy_extent = xy_extent.max(p.x.abs()).max(p.y.abs());
        max_z = max_z.max(p.z.abs());
    }
    max_z <= 1e-9_f64.max(1e-6 * xy_extent)
}

/// Solve the Perspective-n-Point problem for a calibrated camera.
///
/// `object` are 3D points in the board frame, `image` their observed pixel
/// positions in identical order; the returned pose maps board coordinates
/// into camera coordinates. Correspondence length mismatches fail fast
/// before any numerics run — a detector handing over a wrong-sized corner
/// set must never silently produce a pose from scrambled pairings.
///
/// Planar point sets (the chessboard case, z = 0) are initialized from a
/// plane-induced homography decomposition; general sets of six or more
/// points fall back to a 3D DLT. Either way the initial pose is polished by
/// Levenberg-Marquardt over the full distorted camera model.
///
/// Each call is independent: no state, no warm start from earlier frames.
pub fn solve_pnp(
    object: &[Point3<f64>],
    image: &[Point2<f64>],
    camera: &CameraModel,
) -> Result<Pose, PnpError> {
    if object.len() != image.len() {
        return Err(PnpError::CorrespondenceMismatch {
            object: object.len(),
            image: image.len(),
        });
    }
    if object.len() < 4 {
        return Err(PnpError::TooFewPoints {
            got: object.len(),
            need: 4,
        });
    }

    let normalized: Vec<Point2<f64>> = image
        .iter()
        .map(|p| {
            let n = camera.pixel_to_normalized(p);
            Point2::new(n.x, n.y)
        })
        .collect();

    let init = if is_planar(object) {
        let board_xy: Vec<Point2<f64>> = object.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let h = estimate_homography(&board_xy, &normalized)?;
        pose_from_homography(&h)?
    } else {
        dlt_pose(object, &normalized)?
    };
    debug!(
        "pnp init: t = ({:.4}, {:.4}, {:.4})",
        init.translation.x, init.translation.y, init.translation.z
    );

    refine_pose(object, image, camera, &init, &RefineOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use pose_ar_core::{project_points, BoardSpec, CameraIntrinsics, Distortion};

    fn video_camera() -> CameraModel {
        CameraModel::new(
            CameraIntrinsics {
                fx: 627.14888199,
                fy: 625.21197361,
                cx: 213.31259762,
                cy: 367.41067077,
                skew: 0.0,
            },
            Distortion::from_opencv([-0.0715358, 0.04850487, 0.00205158, -0.0074781, 0.12175841]),
        )
        .expect("valid model")
    }

    fn assert_pose_close(a: &Pose, b: &Pose, tol: f64) {
        let dt = (a.translation - b.translation).norm();
        assert!(dt < tol, "translation error too large: {dt}");
        let r_diff = a.rotation.matrix().transpose() * b.rotation.matrix();
        let angle = ((r_diff.trace() - 1.0) * 0.5).clamp(-1.0, 1.0).acos();
        assert!(angle < tol, "rotation error too large: {angle}");
    }

    #[test]
    fn project_then_solve_round_trips_without_distortion() {
        let cam = CameraModel::new(
            CameraIntrinsics {
                fx: 600.0,
                fy: 600.0,
                cx: 320.0,
                cy: 240.0,
                skew: 0.0,
            },
            Distortion::default(),
        )
        .expect("valid model");
        let object = BoardSpec::new(8, 6, 0.03).expect("spec").object_points();

        let pose_gt = Pose::new(
            nalgebra::Rotation3::identity(),
            Vector3::new(0.0, 0.0, 5.0),
        );
        let image = project_points(&object, &pose_gt, &cam);

        let est = solve_pnp(&object, &image, &cam).expect("solve");
        assert_pose_close(&est, &pose_gt, 1e-4);
    }

    #[test]
    fn full_distortion_scenario_recovers_pose_and_camera_position() {
        let cam = video_camera();
        let object = BoardSpec::new(8, 6, 0.03).expect("spec").object_points();

        let pose_gt = Pose::from_axis_angle(
            &Vector3::new(0.3, -0.2, 0.1),
            &Vector3::new(-0.08, 0.05, 0.45),
        );
        let image = project_points(&object, &pose_gt, &cam);

        let est = solve_pnp(&object, &image, &cam).expect("solve");
        assert_pose_close(&est, &pose_gt, 1e-6);

        let dp = (est.camera_position() - pose_gt.camera_position()).norm();
        assert!(dp < 1e-6, "camera position error too large: {dp}");
    }

    #[test]
    fn length_mismatch_fails_before_any_numerics() {
        let cam = video_camera();
        let object = BoardSpec::new(8, 6, 0.03).expect("spec").object_points();
        let image = vec![Point2::new(0.0, 0.0); 47];

        assert!(matches!(
            solve_pnp(&object, &image, &cam),
            Err(PnpError::CorrespondenceMismatch {
                object: 48,
                image: 47
            })
        ));
    }

    #[test]
    fn fewer_than_four_points_fail_fast() {
        let cam = video_camera();
        let object = vec![Point3::new(0.0, 0.0, 0.0); 3];
        let image = vec![Point2::new(0.0, 0.0); 3];
        assert!(matches!(
            solve_pnp(&object, &image, &cam),
            Err(PnpError::TooFewPoints { got: 3, need: 4 })
        ));
    }

    #[test]
    fn collinear_board_points_are_degenerate() {
        let cam = video_camera();
        let object: Vec<Point3<f64>> = (0..8)
            .map(|i| Point3::new(i as f64 * 0.03, 0.0, 0.0))
            .collect();
        let pose = Pose::from_axis_angle(&Vector3::zeros(), &Vector3::new(0.0, 0.0, 0.5));
        let image = project_points(&object, &pose, &cam);

        assert!(matches!(
            solve_pnp(&object, &image, &cam),
            Err(PnpError::Degenerate)
        ));
    }

    #[test]
    fn non_planar_points_take_the_dlt_path() {
        let cam = video_camera();
        let mut object = Vec::new();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    object.push(Point3::new(
                        x as f64 * 0.05,
                        y as f64 * 0.05,
                        z as f64 * 0.05,
                    ));
                }
            }
        }
        let pose_gt = Pose::from_axis_angle(
            &Vector3::new(0.1, 0.05, -0.1),
            &Vector3::new(0.02, -0.04, 0.6),
        );
        let image = project_points(&object, &pose_gt, &cam);

        let est = solve_pnp(&object, &image, &cam).expect("solve");
        assert_pose_close(&est, &pose_gt, 1e-6);
    }
}
