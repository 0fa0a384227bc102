//! The per-frame processing pipeline.

use image::RgbImage;
use log::{debug, warn};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use pose_ar_chessboard::{
    default_chess_config, BoardDetector, BoardDetectorParams, ChessConfig,
};
use pose_ar_core::{
    project_overlay, BoardSpec, BoardSpecError, CameraModel, CameraModelError, OverlayGeometry,
    Pose,
};
use pose_ar_pnp::{solve_pnp, PnpError};
use pose_ar_render::{render_overlay, OverlayStyle};

/// Overlay shape parameters, in board cell units.
///
/// Defaults reproduce the stock cone: centered on an 8x6 board, two cells
/// tall, half a cell in radius, sixteen segments.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub center: (f64, f64),
    pub height: f64,
    pub radius: f64,
    pub segments: usize,
}

impl Default for OverlaySpec {
    fn default() -> Self {
        Self {
            center: (4.5, 3.5),
            height: 2.0,
            radius: 0.5,
            segments: 16,
        }
    }
}

/// Configuration assembled once at startup.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub camera: CameraModel,
    pub board: BoardSpec,
    pub overlay: OverlaySpec,
    pub detector: BoardDetectorParams,
    pub style: OverlayStyle,
}

/// Fatal configuration errors, surfaced before any frame is processed.
#[derive(thiserror::Error, Debug)]
pub enum PipelineConfigError {
    #[error(transparent)]
    Board(#[from] BoardSpecError),

    #[error(transparent)]
    Camera(#[from] CameraModelError),

    #[error("overlay needs at least 3 segments, got {0}")]
    DegenerateOverlay(usize),
}

/// Result of processing one frame.
///
/// The image is mutated only in the `Overlaid` case; misses and solve
/// failures leave the frame untouched and are never retried. `SolveFailed`
/// is control-flow-identical to `NoDetection` — the distinction exists for
/// diagnostics.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Board found, pose solved, overlay drawn into the frame.
    Overlaid {
        pose: Pose,
        camera_position: Vector3<f64>,
    },

    /// Board not (fully) visible; the frame passed through unmodified.
    NoDetection,

    /// Detection succeeded but the pose solve did not.
    SolveFailed(PnpError),
}

impl FrameOutcome {
    /// Camera position when the frame was overlaid.
    pub fn camera_position(&self) -> Option<Vector3<f64>> {
        match self {
            FrameOutcome::Overlaid {
                camera_position, ..
            } => Some(*camera_position),
            _ => None,
        }
    }
}

/// The per-frame pipeline: detect, solve, project, locate, render.
///
/// All contained state is immutable setup data, so a `Pipeline` can be
/// shared read-only across threads; per-frame products live and die inside
/// [`Pipeline::process_frame`].
pub struct Pipeline {
    camera: CameraModel,
    detector: BoardDetector,
    chess_cfg: ChessConfig,
    object_points: Vec<Point3<f64>>,
    overlay: OverlayGeometry,
    style: OverlayStyle,
}

impl Pipeline {
    /// Validate the configuration and precompute the immutable setup data.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineConfigError> {
        config.camera.validate()?;
        config.board.validate()?;
        if config.overlay.segments < 3 {
            return Err(PipelineConfigError::DegenerateOverlay(
                config.overlay.segments,
            ));
        }

        let overlay = OverlayGeometry::cone(
            config.overlay.center,
            config.overlay.height,
            config.overlay.radius,
            config.overlay.segments,
            config.board.cell_size,
        );

        Ok(Self {
            camera: config.camera,
            detector: BoardDetector::new(config.board, config.detector),
            chess_cfg: default_chess_config(),
            object_points: config.board.object_points(),
            overlay,
            style: config.style,
        })
    }

    #[inline]
    pub fn board(&self) -> BoardSpec {
        self.detector.spec()
    }

    /// Process one frame to completion.
    ///
    /// On success the overlay and camera-position readout are drawn into
    /// `frame` in place. A miss or a failed solve leaves the frame exactly
    /// as it came in; nothing partial is ever drawn.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn process_frame(&self, frame: &mut RgbImage) -> FrameOutcome {
        let Some(detection) = self.detector.detect_rgb(frame, &self.chess_cfg) else {
            debug!("board not found; frame passes through");
            return FrameOutcome::NoDetection;
        };

        let image_points = detection.corners_f64();
        let pose = match solve_pnp(&self.object_points, &image_points, &self.camera) {
            Ok(pose) => pose,
            Err(err) => {
                warn!("pose solve failed after a successful detection: {err}");
                return FrameOutcome::SolveFailed(err);
            }
        };

        let projected = project_overlay(&self.overlay, &pose, &self.camera);
        let camera_position = pose.camera_position();
        render_overlay(frame, &projected, &camera_position, &self.style);

        FrameOutcome::Overlaid {
            pose,
            camera_position,
        }
    }
}
