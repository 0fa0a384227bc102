//! Normalized DLT homography estimation.

use nalgebra::{DMatrix, Matrix3, Point2, Vector3};

use crate::PnpError;

fn normalization_transform(pts: &[Point2<f64>]) -> Result<Matrix3<f64>, PnpError> {
    let n = pts.len() as f64;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in pts {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0;
    for p in pts {
        let dx = p.x - cx;
        let dy = p.y - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;
    if mean_dist <= f64::EPSILON {
        // All points coincide.
        return Err(PnpError::Degenerate);
    }

    let s = (2.0_f64).sqrt() / mean_dist;
    Ok(Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0))
}

fn apply(t: &Matrix3<f64>, p: &Point2<f64>) -> Point2<f64> {
    let v = t * Vector3::new(p.x, p.y, 1.0);
    Point2::new(v.x / v.z, v.y / v.z)
}

/// Estimate `H` such that `dst ~ H * src`, via Hartley-normalized DLT.
///
/// Needs at least four correspondences; the 2N x 9 homogeneous system is
/// solved by taking the singular vector of the smallest singular value.
/// Collinear or coincident source points make the system rank-deficient and
/// surface as [`PnpError::Degenerate`].
pub fn estimate_homography(
    src: &[Point2<f64>],
    dst: &[Point2<f64>],
) -> Result<Matrix3<f64>, PnpError> {
    let n = src.len();
    if n != dst.len() {
        return Err(PnpError::CorrespondenceMismatch {
            object: n,
            image: dst.len(),
        });
    }
    if n < 4 {
        return Err(PnpError::TooFewPoints { got: n, need: 4 });
    }

    let t_src = normalization_transform(src)?;
    let t_dst = normalization_transform(dst)?;

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for k in 0..n {
        let s = apply(&t_src, &src[k]);
        let d = apply(&t_dst, &dst[k]);
        let (x, y) = (s.x, s.y);
        let (u, v) = (d.x, d.y);

        a[(2 * k, 0)] = -x;
        a[(2 * k, 1)] = -y;
        a[(2 * k, 2)] = -1.0;
        a[(2 * k, 6)] = u * x;
        a[(2 * k, 7)] = u * y;
        a[(2 * k, 8)] = u;

        a[(2 * k + 1, 3)] = -x;
        a[(2 * k + 1, 4)] = -y;
        a[(2 * k + 1, 5)] = -1.0;
        a[(2 * k + 1, 6)] = v * x;
        a[(2 * k + 1, 7)] = v * y;
        a[(2 * k + 1, 8)] = v;
    }

    let svd = a.svd(true, true);
    let v_t = svd.v_t.ok_or(PnpError::SvdFailed)?;
    let h_row = v_t.row(v_t.nrows() - 1);

    // Rank deficiency shows up as a vanishing second-smallest singular
    // value; the solution direction is then not unique.
    let sv = &svd.singular_values;
    if sv.len() >= 2 && sv[sv.len() - 2] <= 1e-12 * sv[0].max(1.0) {
        return Err(PnpError::Degenerate);
    }

    let hn = Matrix3::from_row_slice(&[
        h_row[0], h_row[1], h_row[2], //
        h_row[3], h_row[4], h_row[5], //
        h_row[6], h_row[7], h_row[8],
    ]);

    // Denormalize: H = T_dst^{-1} * Hn * T_src.
    let t_dst_inv = t_dst.try_inverse().ok_or(PnpError::SvdFailed)?;
    let h = t_dst_inv * hn * t_src;

    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 {
        return Err(PnpError::Degenerate);
    }
    Ok(h / scale)
}
