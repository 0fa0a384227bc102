//! Chessboard specification and its 3D corner grid.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Static chessboard specification.
///
/// `cols`/`rows` are **inner corner** counts (one less than the square
/// counts along each side). `cell_size` is the physical square edge length;
/// its unit defines the unit of every pose and camera position downstream.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoardSpec {
    pub cols: u32,
    pub rows: u32,
    pub cell_size: f64,
}

/// Board specification validation errors.
#[derive(thiserror::Error, Debug)]
pub enum BoardSpecError {
    #[error("cols and rows must be >= 2, got {cols}x{rows}")]
    InvalidGridSize { cols: u32, rows: u32 },
    #[error("cell_size must be finite and > 0, got {0}")]
    InvalidCellSize(f64),
}

impl BoardSpec {
    /// Validate and create a board spec.
    pub fn new(cols: u32, rows: u32, cell_size: f64) -> Result<Self, BoardSpecError> {
        let spec = Self {
            cols,
            rows,
            cell_size,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the invariants promised by [`BoardSpec::new`].
    ///
    /// Useful after deserializing a spec from a config file.
    pub fn validate(&self) -> Result<(), BoardSpecError> {
        if self.cols < 2 || self.rows < 2 {
            return Err(BoardSpecError::InvalidGridSize {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(BoardSpecError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }

    /// Total number of inner corners.
    #[inline]
    pub fn corner_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// 3D positions of the inner corners in the board frame.
    ///
    /// Row-major: corner `(c, r)` lands at index `r * cols + c`, at
    /// `(c * cell_size, r * cell_size, 0)`. The board plane is `z = 0`;
    /// every detector and solver in this workspace relies on this ordering.
    pub fn object_points(&self) -> Vec<Point3<f64>> {
        let mut points = Vec::with_capacity(self.corner_count());
        for r in 0..self.rows {
            for c in 0..self.cols {
                points.push(Point3::new(
                    c as f64 * self.cell_size,
                    r as f64 * self.cell_size,
                    0.0,
                ));
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_points_are_row_major_on_the_z0_plane() {
        let spec = BoardSpec::new(8, 6, 0.03).expect("valid spec");
        let points = spec.object_points();

        assert_eq!(points.len(), 48);
        for (i, p) in points.iter().enumerate() {
            let c = i % 8;
            let r = i / 8;
            assert_eq!(p.x, c as f64 * 0.03);
            assert_eq!(p.y, r as f64 * 0.03);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn ordering_is_strictly_increasing_within_rows_and_across_rows() {
        let spec = BoardSpec::new(4, 3, 1.0).expect("valid spec");
        let points = spec.object_points();

        for pair in points.windows(2) {
            let key0 = (pair[0].y, pair[0].x);
            let key1 = (pair[1].y, pair[1].x);
            assert!(key0 < key1, "row-major order violated: {key0:?} !< {key1:?}");
        }
    }

    #[test]
    fn rejects_degenerate_specs() {
        assert!(matches!(
            BoardSpec::new(1, 6, 0.03),
            Err(BoardSpecError::InvalidGridSize { .. })
        ));
        assert!(matches!(
            BoardSpec::new(8, 6, 0.0),
            Err(BoardSpecError::InvalidCellSize(_))
        ));
        assert!(matches!(
            BoardSpec::new(8, 6, f64::NAN),
            Err(BoardSpecError::InvalidCellSize(_))
        ));
    }
}
