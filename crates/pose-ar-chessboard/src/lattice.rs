//! Exact-size lattice fit and canonical corner ordering.
//!
//! BFS lattice coordinates are relative to an arbitrary origin and an
//! arbitrary handedness. This module checks that a component fills the
//! expected `cols x rows` grid completely and maps it onto the board's
//! row-major order deterministically, so the same frame always yields the
//! same correspondence with `BoardSpec::object_points`.

use nalgebra::Point2;

use crate::detector::Corner;

/// Lattice occupancy normalized to `(0..w, 0..h)`.
struct Occupancy {
    cells: Vec<Option<usize>>,
    w: usize,
    h: usize,
}

impl Occupancy {
    fn from_coords(coords: &[(usize, i32, i32)]) -> Option<Self> {
        let min_i = coords.iter().map(|&(_, i, _)| i).min()?;
        let max_i = coords.iter().map(|&(_, i, _)| i).max()?;
        let min_j = coords.iter().map(|&(_, _, j)| j).min()?;
        let max_j = coords.iter().map(|&(_, _, j)| j).max()?;

        let w = (max_i - min_i + 1) as usize;
        let h = (max_j - min_j + 1) as usize;
        let mut cells = vec![None; w * h];

        for &(idx, i, j) in coords {
            let cell = &mut cells[(j - min_j) as usize * w + (i - min_i) as usize];
            if cell.is_some() {
                // Two corners claimed the same lattice cell; the BFS walked
                // an inconsistent graph.
                return None;
            }
            *cell = Some(idx);
        }

        Some(Self { cells, w, h })
    }

    fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    fn at(&self, i: usize, j: usize) -> usize {
        self.cells[j * self.w + i].expect("checked complete")
    }
}

/// One of the eight lattice-to-board orientation candidates.
#[derive(Clone, Copy)]
struct Orientation {
    transpose: bool,
    flip_c: bool,
    flip_r: bool,
}

impl Orientation {
    /// Corner index for board cell `(c, r)` under this orientation.
    fn corner_at(&self, occ: &Occupancy, c: usize, r: usize, cols: usize, rows: usize) -> usize {
        let (mut i, mut j) = if self.transpose { (r, c) } else { (c, r) };
        let (wi, wj) = if self.transpose {
            (rows, cols)
        } else {
            (cols, rows)
        };
        if self.flip_c {
            if self.transpose {
                j = wj - 1 - j;
            } else {
                i = wi - 1 - i;
            }
        }
        if self.flip_r {
            if self.transpose {
                i = wi - 1 - i;
            } else {
                j = wj - 1 - j;
            }
        }
        occ.at(i, j)
    }
}

/// Fit a component's lattice coordinates onto the `cols x rows` board.
///
/// Returns the corner positions in row-major board order, or `None` when the
/// component does not cover the full grid exactly. For non-square boards a
/// transposed lattice is accepted and reoriented; ambiguity between the
/// remaining orientations is resolved deterministically by preferring column
/// progression along +x and row progression along +y in image space.
pub fn fit_board_grid(
    corners: &[Corner],
    coords: &[(usize, i32, i32)],
    cols: usize,
    rows: usize,
) -> Option<Vec<Point2<f32>>> {
    if cols < 2 || rows < 2 || coords.len() != cols * rows {
        return None;
    }

    let occ = Occupancy::from_coords(coords)?;
    if !occ.is_complete() {
        return None;
    }

    let direct = occ.w == cols && occ.h == rows;
    let transposed = occ.w == rows && occ.h == cols;
    if !direct && !transposed {
        return None;
    }

    let mut candidates = Vec::with_capacity(8);
    for &transpose in &[false, true] {
        if (transpose && !transposed) || (!transpose && !direct) {
            continue;
        }
        for &flip_c in &[false, true] {
            for &flip_r in &[false, true] {
                candidates.push(Orientation {
                    transpose,
                    flip_c,
                    flip_r,
                });
            }
        }
    }

    let position = |o: &Orientation, c: usize, r: usize| -> Point2<f32> {
        corners[o.corner_at(&occ, c, r, cols, rows)].position
    };

    let mut best: Option<(f32, f32, Orientation)> = None;
    for o in candidates {
        let origin = position(&o, 0, 0);
        let row_step = position(&o, 1, 0) - origin;
        let col_step = position(&o, 0, 1) - origin;

        // Prefer +x column progression and +y row progression; fall back to
        // the corner closest to the image origin.
        let alignment = row_step.x + col_step.y;
        let origin_key = origin.x + origin.y;
        let better = match &best {
            None => true,
            Some((best_alignment, best_origin, _)) => {
                alignment > *best_alignment
                    || (alignment == *best_alignment && origin_key < *best_origin)
            }
        };
        if better {
            best = Some((alignment, origin_key, o));
        }
    }

    let (_, _, orientation) = best?;
    let mut ordered = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            ordered.push(position(&orientation, c, r));
        }
    }
    Some(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn make_corner(x: f32, y: f32) -> Corner {
        Corner {
            position: Point2::new(x, y),
            orientation: FRAC_PI_4,
            strength: 1.0,
        }
    }

    /// Corners of a cols x rows grid plus BFS-style coords, optionally
    /// scrambled through the given lattice transform.
    fn grid_fixture(
        cols: usize,
        rows: usize,
        transform: impl Fn(i32, i32) -> (i32, i32),
    ) -> (Vec<Corner>, Vec<(usize, i32, i32)>) {
        let mut corners = Vec::new();
        let mut coords = Vec::new();
        for r in 0..rows as i32 {
            for c in 0..cols as i32 {
                let idx = corners.len();
                corners.push(make_corner(c as f32 * 10.0, r as f32 * 10.0));
                let (i, j) = transform(c, r);
                coords.push((idx, i, j));
            }
        }
        (corners, coords)
    }

    #[test]
    fn identity_lattice_maps_straight_through() {
        let (corners, coords) = grid_fixture(4, 3, |c, r| (c, r));
        let ordered = fit_board_grid(&corners, &coords, 4, 3).expect("fit");

        assert_eq!(ordered.len(), 12);
        for r in 0..3 {
            for c in 0..4 {
                let p = ordered[r * 4 + c];
                assert_eq!(p.x, c as f32 * 10.0);
                assert_eq!(p.y, r as f32 * 10.0);
            }
        }
    }

    #[test]
    fn shifted_and_flipped_lattices_are_canonicalized() {
        // BFS happened to start mid-board and walked with inverted axes.
        let (corners, coords) = grid_fixture(4, 3, |c, r| (5 - c, 7 - r));
        let ordered = fit_board_grid(&corners, &coords, 4, 3).expect("fit");

        // Canonical order must be identical to the identity case.
        for r in 0..3 {
            for c in 0..4 {
                let p = ordered[r * 4 + c];
                assert_eq!(p.x, c as f32 * 10.0);
                assert_eq!(p.y, r as f32 * 10.0);
            }
        }
    }

    #[test]
    fn transposed_lattice_is_accepted_for_non_square_boards() {
        let (corners, coords) = grid_fixture(4, 3, |c, r| (r, c));
        let ordered = fit_board_grid(&corners, &coords, 4, 3).expect("fit");
        assert_eq!(ordered[0].x, 0.0);
        assert_eq!(ordered[1].x, 10.0);
        assert_eq!(ordered[4].y, 10.0);
    }

    #[test]
    fn incomplete_grids_are_rejected() {
        let (corners, mut coords) = grid_fixture(4, 3, |c, r| (c, r));
        coords.pop();
        assert!(fit_board_grid(&corners, &coords, 4, 3).is_none());
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let (corners, coords) = grid_fixture(5, 3, |c, r| (c, r));
        assert!(fit_board_grid(&corners, &coords, 4, 3).is_none());
    }

    #[test]
    fn duplicate_cells_are_rejected() {
        let (corners, mut coords) = grid_fixture(4, 3, |c, r| (c, r));
        // Two corners claim the same cell, one cell stays empty.
        coords[11] = (coords[11].0, 0, 0);
        assert!(fit_board_grid(&corners, &coords, 4, 3).is_none());
    }
}
