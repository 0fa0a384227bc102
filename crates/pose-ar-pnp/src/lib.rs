//! Perspective-n-Point pose estimation.
//!
//! Recovers the board-to-camera pose from 2D-3D point correspondences under
//! a calibrated camera model. Pixels are undistorted into normalized image
//! coordinates first; initialization uses a plane-induced homography
//! decomposition for planar targets (the chessboard case) or a normalized
//! 3D DLT for general point sets, and a Levenberg-Marquardt pass over the
//! minimal axis-angle + translation parametrization polishes the pose
//! against full-model pixel reprojection error.
//!
//! Every call is independent: there is no warm-starting from a previous
//! frame's pose.

mod dlt;
mod homography;
mod planar;
mod refine;
mod solver;

pub use homography::estimate_homography;
pub use planar::pose_from_homography;
pub use refine::{refine_pose, RefineOptions};
pub use solver::solve_pnp;

/// Pose solver failures.
///
/// A failed solve is handled like a detection miss by the frame pipeline;
/// the variants exist for diagnostics, not for control flow.
#[derive(thiserror::Error, Debug)]
pub enum PnpError {
    #[error("correspondence length mismatch: {object} object points vs {image} image points")]
    CorrespondenceMismatch { object: usize, image: usize },

    #[error("need at least {need} point correspondences, got {got}")]
    TooFewPoints { got: usize, need: usize },

    #[error("degenerate point configuration")]
    Degenerate,

    #[error("singular value decomposition failed")]
    SvdFailed,

    #[error("pose refinement did not converge")]
    DidNotConverge,
}
