//! Direct Linear Transform initialization for non-planar point sets.

use nalgebra::{DMatrix, Matrix3, Matrix3x4, Matrix4, Point2, Point3, Rotation3, Vector3};

use pose_ar_core::Pose;

use crate::PnpError;

/// Linear pose estimate from 3D points and *normalized* image coordinates.
///
/// Solves the homogeneous system for the 3x4 matrix `P = [R | t]` (up to
/// scale) with Hartley-style normalization of the 3D points, then projects
/// the rotation block onto SO(3). Needs at least six correspondences and a
/// non-degenerate spatial configuration.
pub fn dlt_pose(world: &[Point3<f64>], norm_img: &[Point2<f64>]) -> Result<Pose, PnpError> {
    let n = world.len();
    if n != norm_img.len() {
        return Err(PnpError::CorrespondenceMismatch {
            object: n,
            image: norm_img.len(),
        });
    }
    if n < 6 {
        return Err(PnpError::TooFewPoints { got: n, need: 6 });
    }

    let n_real = n as f64;
    let mut centroid = Vector3::zeros();
    for p in world {
        centroid += p.coords;
    }
    centroid /= n_real;

    let mut mean_dist = 0.0;
    for p in world {
        mean_dist += (p.coords - centroid).norm();
    }
    mean_dist /= n_real;
    if mean_dist <= f64::EPSILON {
        return Err(PnpError::Degenerate);
    }

    let scale = (3.0_f64).sqrt() / mean_dist;
    let t_world = Matrix4::new(
        scale, 0.0, 0.0, -scale * centroid.x, //
        0.0, scale, 0.0, -scale * centroid.y, //
        0.0, 0.0, scale, -scale * centroid.z, //
        0.0, 0.0, 0.0, 1.0,
    );

    let mut a = DMatrix::<f64>::zeros(2 * n, 12);
    for (i, (pw, uv)) in world.iter().zip(norm_img.iter()).enumerate() {
        let x = (pw.x - centroid.x) * scale;
        let y = (pw.y - centroid.y) * scale;
        let z = (pw.z - centroid.z) * scale;
        let (u, v) = (uv.x, uv.y);

        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = z;
        a[(r0, 3)] = 1.0;
        a[(r0, 8)] = -u * x;
        a[(r0, 9)] = -u * y;
        a[(r0, 10)] = -u * z;
        a[(r0, 11)] = -u;

        a[(r1, 4)] = x;
        a[(r1, 5)] = y;
        a[(r1, 6)] = z;
        a[(r1, 7)] = 1.0;
        a[(r1, 8)] = -v * x;
        a[(r1, 9)] = -v * y;
        a[(r1, 10)] = -v * z;
        a[(r1, 11)] = -v;
    }

    let svd = a.svd(true, true);
    let v_t = svd.v_t.ok_or(PnpError::SvdFailed)?;
    let p_row = v_t.row(v_t.nrows() - 1);

    let p_norm = Matrix3x4::from_row_slice(&[
        p_row[0], p_row[1], p_row[2], p_row[3], //
        p_row[4], p_row[5], p_row[6], p_row[7], //
        p_row[8], p_row[9], p_row[10], p_row[11],
    ]);
    let p_mtx = p_norm * t_world;

    let m: Matrix3<f64> = p_mtx.fixed_view::<3, 3>(0, 0).into_owned();

    // Fix the overall scale from the average row norm, and the sign from the
    // determinant (a valid rotation has det +1).
    let mut s = (m.row(0).norm() + m.row(1).norm() + m.row(2).norm()) / 3.0;
    if s <= f64::EPSILON {
        return Err(PnpError::Degenerate);
    }
    if m.determinant() < 0.0 {
        s = -s;
    }
    let r_approx = m / s;

    let svd = r_approx.svd(true, true);
    let u = svd.u.ok_or(PnpError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(PnpError::SvdFailed)?;
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let t = p_mtx.column(3) / s;

    Ok(Pose::new(
        Rotation3::from_matrix_unchecked(r_orth),
        Vector3::new(t.x, t.y, t.z),
    ))
}
