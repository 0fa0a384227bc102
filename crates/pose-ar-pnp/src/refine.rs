//! Levenberg-Marquardt pose refinement.

use nalgebra::{Matrix6, Point2, Point3, Vector6};

use pose_ar_core::{project_point, CameraModel, Pose};

use crate::PnpError;

/// Refinement options.
#[derive(Clone, Copy, Debug)]
pub struct RefineOptions {
    /// Maximal number of outer LM iterations.
    pub max_iters: usize,

    /// Stop when the squared-error reduction falls below this fraction.
    pub rel_tolerance: f64,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            max_iters: 30,
            rel_tolerance: 1e-12,
        }
    }
}

fn pose_from_params(x: &Vector6<f64>) -> Pose {
    Pose::from_axis_angle(&x.fixed_rows::<3>(0).into_owned(), &x.fixed_rows::<3>(3).into_owned())
}

fn cost(object: &[Point3<f64>], image: &[Point2<f64>], camera: &CameraModel, x: &Vector6<f64>) -> f64 {
    let pose = pose_from_params(x);
    let mut sum = 0.0;
    for (pw, obs) in object.iter().zip(image.iter()) {
        let proj = project_point(pw, &pose, camera);
        let dx = proj.x - obs.x;
        let dy = proj.y - obs.y;
        sum += dx * dx + dy * dy;
    }
    sum
}

/// Accumulate the normal equations with a central-difference Jacobian.
fn normal_equations(
    object: &[Point3<f64>],
    image: &[Point2<f64>],
    camera: &CameraModel,
    x: &Vector6<f64>,
) -> (Matrix6<f64>, Vector6<f64>) {
    const STEP: f64 = 1e-6;

    let pose = pose_from_params(x);
    let projections: Vec<Point2<f64>> = object
        .iter()
        .map(|p| project_point(p, &pose, camera))
        .collect();

    // Per-parameter forward/backward projections.
    let mut plus = Vec::with_capacity(6);
    let mut minus = Vec::with_capacity(6);
    for k in 0..6 {
        let mut xp = *x;
        let mut xm = *x;
        xp[k] += STEP;
        xm[k] -= STEP;
        let pose_p = pose_from_params(&xp);
        let pose_m = pose_from_params(&xm);
        plus.push(
            object
                .iter()
                .map(|p| project_point(p, &pose_p, camera))
                .collect::<Vec<_>>(),
        );
        minus.push(
            object
                .iter()
                .map(|p| project_point(p, &pose_m, camera))
                .collect::<Vec<_>>(),
        );
    }

    let mut jtj = Matrix6::zeros();
    let mut jtr = Vector6::zeros();
    for (i, obs) in image.iter().enumerate() {
        let rx = projections[i].x - obs.x;
        let ry = projections[i].y - obs.y;

        let mut jx = [0.0; 6];
        let mut jy = [0.0; 6];
        for k in 0..6 {
            jx[k] = (plus[k][i].x - minus[k][i].x) / (2.0 * STEP);
            jy[k] = (plus[k][i].y - minus[k][i].y) / (2.0 * STEP);
        }

        for a in 0..6 {
            jtr[a] += jx[a] * rx + jy[a] * ry;
            for b in 0..6 {
                jtj[(a, b)] += jx[a] * jx[b] + jy[a] * jy[b];
            }
        }
    }

    (jtj, jtr)
}

/// Polish a pose by minimizing full-model pixel reprojection error.
///
/// The pose is parametrized minimally as axis-angle rotation + translation,
/// so every iterate reconstructs an exactly orthonormal rotation. Classic
/// multiplicative damping: a step that reduces the squared error is accepted
/// and the damping relaxed; otherwise the damping grows until either a step
/// succeeds or the solve is declared non-convergent.
pub fn refine_pose(
    object: &[Point3<f64>],
    image: &[Point2<f64>],
    camera: &CameraModel,
    init: &Pose,
    opts: &RefineOptions,
) -> Result<Pose, PnpError> {
    let mut x = Vector6::zeros();
    x.fixed_rows_mut::<3>(0).copy_from(&init.axis_angle());
    x.fixed_rows_mut::<3>(3).copy_from(&init.translation);

    let mut current_cost = cost(object, image, camera, &x);
    if !current_cost.is_finite() {
        return Err(PnpError::DidNotConverge);
    }

    let mut lambda = 1e-3;
    for _ in 0..opts.max_iters {
        let (jtj, jtr) = normal_equations(object, image, camera, &x);

        let mut stepped = false;
        while lambda < 1e10 {
            let mut damped = jtj;
            for d in 0..6 {
                damped[(d, d)] += lambda * jtj[(d, d)].max(1e-12);
            }

            let Some(chol) = damped.cholesky() else {
                lambda *= 10.0;
                continue;
            };
            let dx = chol.solve(&(-jtr));
            let candidate = x + dx;
            let candidate_cost = cost(object, image, camera, &candidate);

            if candidate_cost.is_finite() && candidate_cost < current_cost {
                let reduction = (current_cost - candidate_cost) / current_cost.max(f64::EPSILON);
                x = candidate;
                current_cost = candidate_cost;
                lambda = (lambda * 0.1).max(1e-12);
                stepped = true;
                if reduction < opts.rel_tolerance {
                    return Ok(pose_from_params(&x));
                }
                break;
            }
            lambda *= 10.0;
        }

        if !stepped {
            // Damping exhausted without a successful step: either we are at
            // a (local) minimum, or the problem is numerically hopeless.
            break;
        }
    }

    if !current_cost.is_finite() {
        return Err(PnpError::DidNotConverge);
    }
    Ok(pose_from_params(&x))
}
