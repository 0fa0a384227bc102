//! Per-frame chessboard pose estimation with an augmented-reality overlay.
//!
//! This crate wires the workspace together: detect the board's corner grid,
//! solve the Perspective-n-Point problem, project the synthetic overlay,
//! derive the camera position and burn everything into the frame. Each
//! frame is processed independently from scratch; a frame where the board
//! is not found (or the solve fails) passes through untouched.
//!
//! ## Quickstart
//!
//! ```no_run
//! use pose_ar::{BoardSpec, CameraIntrinsics, CameraModel, Distortion};
//! use pose_ar::{OverlaySpec, Pipeline, PipelineConfig};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let camera = CameraModel::new(
//!     CameraIntrinsics { fx: 627.15, fy: 625.21, cx: 213.31, cy: 367.41, skew: 0.0 },
//!     Distortion::from_opencv([-0.0715, 0.0485, 0.0021, -0.0075, 0.1218]),
//! )?;
//! let config = PipelineConfig {
//!     camera,
//!     board: BoardSpec::new(8, 6, 0.03)?,
//!     overlay: OverlaySpec::default(),
//!     detector: Default::default(),
//!     style: Default::default(),
//! };
//! let pipeline = Pipeline::new(config)?;
//!
//! let mut frame = ImageReader::open("frame.png")?.decode()?.to_rgb8();
//! let outcome = pipeline.process_frame(&mut frame);
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`core`](pose_ar_core): board spec, camera model, pose, projection,
//!   overlay geometry.
//! - [`chessboard`](pose_ar_chessboard): full-grid corner detection.
//! - [`pnp`](pose_ar_pnp): the pose solver.
//! - [`render`](pose_ar_render): raster primitives and the overlay renderer.
//! - [`Pipeline`]: the per-frame entry point.

pub use pose_ar_chessboard as chessboard;
pub use pose_ar_core as core;
pub use pose_ar_pnp as pnp;
pub use pose_ar_render as render;

pub use pose_ar_core::{
    BoardSpec, CameraIntrinsics, CameraModel, Distortion, OverlayGeometry, Pose,
};
pub use pose_ar_pnp::{solve_pnp, PnpError};
pub use pose_ar_render::OverlayStyle;

mod pipeline;

pub use pipeline::{FrameOutcome, OverlaySpec, Pipeline, PipelineConfig, PipelineConfigError};
