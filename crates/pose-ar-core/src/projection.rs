//! Forward projection: board-frame 3D points to pixel coordinates.

use nalgebra::{Point2, Point3, Vector2};

use crate::camera::CameraModel;
use crate::overlay::{OverlayGeometry, ProjectedOverlay};
use crate::pose::Pose;

/// Project one board-frame point through `pose` and the full camera model.
///
/// Transform to the camera frame, perspective-divide, distort, map through
/// the intrinsics. Pure and deterministic: identical inputs give bit
/// identical pixels. Points at or behind the camera center (z <= 0) yield
/// advisory, possibly non-finite coordinates rather than an error; the
/// raster layer clips per pixel.
pub fn project_point(p: &Point3<f64>, pose: &Pose, camera: &CameraModel) -> Point2<f64> {
    let pc = pose.transform_point(p);
    let n = Vector2::new(pc.x / pc.z, pc.y / pc.z);
    camera.normalized_to_pixel(&n)
}

/// Project a slice of board-frame points, preserving order.
pub fn project_points(
    points: &[Point3<f64>],
    pose: &Pose,
    camera: &CameraModel,
) -> Vec<Point2<f64>> {
    points
        .iter()
        .map(|p| project_point(p, pose, camera))
        .collect()
}

/// Project an overlay, carrying its structured layout along.
pub fn project_overlay(
    overlay: &OverlayGeometry,
    pose: &Pose,
    camera: &CameraModel,
) -> ProjectedOverlay {
    ProjectedOverlay::new(
        project_points(overlay.points(), pose, camera),
        overlay.segments(),
    )
}
