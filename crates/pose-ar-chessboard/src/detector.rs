//! Full-grid board detector: ChESS corners to ordered board corners.

use chess_corners::{find_chess_corners_image, ChessConfig, CornerDescriptor};
use log::{debug, info};
use nalgebra::Point2;

use pose_ar_core::BoardSpec;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::gridgraph::GridGraph;
use crate::lattice::fit_board_grid;
use crate::params::BoardDetectorParams;

/// A raw detected corner: position, diagonal orientation, response strength.
#[derive(Clone, Debug)]
pub struct Corner {
    /// Position in pixel coordinates.
    pub position: Point2<f32>,

    /// Diagonal orientation in radians, defined modulo π.
    pub orientation: f32,

    /// Detector response strength.
    pub strength: f32,
}

/// All inner corners of a fully visible board, in row-major board order.
///
/// `corners[r * cols + c]` corresponds to `object_points()[r * cols + c]`;
/// this index-for-index pairing is what makes the downstream PnP solve valid.
#[derive(Clone, Debug)]
pub struct BoardDetection {
    pub corners: Vec<Point2<f32>>,
}

impl BoardDetection {
    /// Corner positions widened to f64, as consumed by the pose solver.
    pub fn corners_f64(&self) -> Vec<Point2<f64>> {
        self.corners
            .iter()
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect()
    }
}

/// Reasonable default settings for the `chess-corners` ChESS detector.
///
/// Tuned for well-lit video frames; callers with difficult footage override
/// the relative threshold.
pub fn default_chess_config() -> ChessConfig {
    let mut cfg = ChessConfig::single_scale();
    cfg.params.threshold_rel = 0.2;
    cfg.params.nms_radius = 2;
    cfg
}

fn adapt_chess_corner(c: &CornerDescriptor) -> Corner {
    Corner {
        position: Point2::new(c.x, c.y),
        orientation: c.orientation,
        strength: c.response,
    }
}

/// Detect ChESS corners and adapt them into [`Corner`].
pub fn detect_corners(img: &image::GrayImage, cfg: &ChessConfig) -> Vec<Corner> {
    find_chess_corners_image(img, cfg)
        .iter()
        .map(adapt_chess_corner)
        .collect()
}

/// Detector for one fixed board specification.
#[derive(Clone, Debug)]
pub struct BoardDetector {
    spec: BoardSpec,
    params: BoardDetectorParams,
}

impl BoardDetector {
    pub fn new(spec: BoardSpec, params: BoardDetectorParams) -> Self {
        Self { spec, params }
    }

    #[inline]
    pub fn spec(&self) -> BoardSpec {
        self.spec
    }

    /// Run the detector end-to-end on a grayscale frame.
    ///
    /// Returns `None` when the board is not fully visible; a `Some` result
    /// always carries exactly `cols * rows` corners in row-major order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img, chess_cfg), fields(width = img.width(), height = img.height()))
    )]
    pub fn detect(&self, img: &image::GrayImage, chess_cfg: &ChessConfig) -> Option<BoardDetection> {
        let corners = detect_corners(img, chess_cfg);
        self.detect_from_corners(&corners)
    }

    /// Convenience entry point for RGB frames.
    pub fn detect_rgb(
        &self,
        img: &image::RgbImage,
        chess_cfg: &ChessConfig,
    ) -> Option<BoardDetection> {
        let gray = image::imageops::grayscale(img);
        self.detect(&gray, chess_cfg)
    }

    /// Grid assembly from already-detected corners.
    pub fn detect_from_corners(&self, corners: &[Corner]) -> Option<BoardDetection> {
        let expected = self.spec.corner_count();

        let strong: Vec<Corner> = corners
            .iter()
            .filter(|c| c.strength >= self.params.min_strength)
            .cloned()
            .collect();
        debug!(
            "{} of {} corners passed the strength filter",
            strong.len(),
            corners.len()
        );

        // Fast reject: fewer candidates than board corners means the board
        // cannot be fully visible in this frame.
        if strong.len() < expected {
            debug!(
                "fast reject: {} corners < {} board corners",
                strong.len(),
                expected
            );
            return None;
        }

        let graph = GridGraph::build(&strong, &self.params.grid);

        let cols = self.spec.cols as usize;
        let rows = self.spec.rows as usize;
        for component in graph.components() {
            if component.len() != expected {
                continue;
            }
            let coords = graph.lattice_coords(&component);
            if let Some(ordered) = fit_board_grid(&strong, &coords, cols, rows) {
                info!("board located: {} corners in canonical order", expected);
                return Some(BoardDetection { corners: ordered });
            }
        }

        debug!("no component matched the {cols}x{rows} grid exactly");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GridGraphParams;
    use std::f32::consts::FRAC_PI_4;

    fn grid_corners(cols: usize, rows: usize, spacing: f32, origin: (f32, f32)) -> Vec<Corner> {
        let mut corners = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let orientation = if (c + r) % 2 == 0 {
                    FRAC_PI_4
                } else {
                    3.0 * FRAC_PI_4
                };
                corners.push(Corner {
                    position: Point2::new(
                        origin.0 + c as f32 * spacing,
                        origin.1 + r as f32 * spacing,
                    ),
                    orientation,
                    strength: 1.0,
                });
            }
        }
        corners
    }

    fn detector(cols: u32, rows: u32) -> BoardDetector {
        let spec = BoardSpec::new(cols, rows, 0.03).expect("valid spec");
        let params = BoardDetectorParams {
            min_strength: 0.5,
            grid: GridGraphParams {
                min_spacing_pix: 5.0,
                max_spacing_pix: 15.0,
                ..Default::default()
            },
        };
        BoardDetector::new(spec, params)
    }

    #[test]
    fn full_grid_is_detected_in_row_major_order() {
        let det = detector(4, 3);
        let corners = grid_corners(4, 3, 10.0, (100.0, 50.0));
        let found = det.detect_from_corners(&corners).expect("detection");

        assert_eq!(found.corners.len(), 12);
        for r in 0..3 {
            for c in 0..4 {
                let p = found.corners[r * 4 + c];
                assert_eq!(p.x, 100.0 + c as f32 * 10.0);
                assert_eq!(p.y, 50.0 + r as f32 * 10.0);
            }
        }
    }

    #[test]
    fn ordering_is_invariant_to_input_permutation() {
        let det = detector(4, 3);
        let corners = grid_corners(4, 3, 10.0, (0.0, 0.0));
        let mut shuffled = corners.clone();
        shuffled.reverse();
        shuffled.swap(2, 9);

        let a = det.detect_from_corners(&corners).expect("detection");
        let b = det.detect_from_corners(&shuffled).expect("detection");
        assert_eq!(a.corners, b.corners);
    }

    #[test]
    fn partial_board_is_a_miss() {
        let det = detector(4, 3);
        let mut corners = grid_corners(4, 3, 10.0, (0.0, 0.0));
        corners.pop();
        assert!(det.detect_from_corners(&corners).is_none());
    }

    #[test]
    fn weak_corners_are_filtered_before_assembly() {
        let det = detector(4, 3);
        let mut corners = grid_corners(4, 3, 10.0, (0.0, 0.0));
        for c in &mut corners {
            c.strength = 0.1;
        }
        assert!(det.detect_from_corners(&corners).is_none());
    }

    #[test]
    fn empty_frame_is_rejected_fast() {
        let det = detector(8, 6);
        assert!(det.detect_from_corners(&[]).is_none());
    }

    #[test]
    fn all_black_image_yields_no_detection() {
        let det = detector(4, 3);
        let img = image::GrayImage::new(320, 240);
        let cfg = default_chess_config();
        assert!(det.detect(&img, &cfg).is_none());
    }
}
