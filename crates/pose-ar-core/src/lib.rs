//! Core types for chessboard-based camera pose estimation.
//!
//! This crate is purely geometric: board specification and its 3D corner
//! grid, the pinhole + Brown-Conrady camera model, rigid poses, point
//! projection and the synthetic overlay geometry. It does *not* depend on
//! any concrete corner detector or image type.

mod board;
mod camera;
mod logger;
mod overlay;
mod pose;
mod projection;

pub use board::{BoardSpec, BoardSpecError};
pub use camera::{CameraIntrinsics, CameraModel, CameraModelError, Distortion};
pub use overlay::{OverlayGeometry, ProjectedOverlay};
pub use pose::Pose;
pub use projection::{project_overlay, project_point, project_points};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
