//! Pose from a plane-induced homography.

use nalgebra::{Matrix3, Rotation3, Vector3};

use pose_ar_core::Pose;

use crate::PnpError;

/// Decompose a homography from the board plane (z = 0, board units) to the
/// *normalized* image plane into a pose.
///
/// For a plane target, `H ~ [r1 r2 t]` up to scale once intrinsics are
/// stripped off. The scale is fixed by the unit length of the first two
/// rotation columns (averaged for robustness), `r3 = r1 x r2`, and the
/// resulting matrix is projected onto SO(3) by SVD so the returned rotation
/// is exactly orthonormal with determinant +1. The sign of `H` is chosen so
/// the target sits in front of the camera (positive depth).
pub fn pose_from_homography(h: &Matrix3<f64>) -> Result<Pose, PnpError> {
    let h1 = h.column(0).into_owned();
    let h2 = h.column(1).into_owned();
    let h3 = h.column(2).into_owned();

    let norm1 = h1.norm();
    let norm2 = h2.norm();
    if norm1 <= f64::EPSILON || norm2 <= f64::EPSILON {
        return Err(PnpError::Degenerate);
    }
    let mut lambda = 2.0 / (norm1 + norm2);

    // A homography is defined up to sign; pick the one with the plane in
    // front of the camera.
    if h3.z < 0.0 {
        lambda = -lambda;
    }

    let r1 = lambda * h1;
    let r2 = lambda * h2;
    let r3 = r1.cross(&r2);
    let t = lambda * h3;

    let mut r_approx = Matrix3::zeros();
    r_approx.set_column(0, &r1);
    r_approx.set_column(1, &r2);
    r_approx.set_column(2, &r3);

    let svd = r_approx.svd(true, true);
    let u = svd.u.ok_or(PnpError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(PnpError::SvdFailed)?;
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    Ok(Pose::new(
        Rotation3::from_matrix_unchecked(r_orth),
        Vector3::new(t.x, t.y, t.z),
    ))
}
