//! 4-connected grid graph over ChESS corners.
//!
//! Each corner gets at most one link per compass direction. Candidate links
//! come from a kNN query and must pass two orientation gates:
//! - the two corners' diagonal orientations are approximately orthogonal
//!   (adjacent chessboard corners have crossed diagonals),
//! - the edge between them runs at ~45 degrees to both diagonals (corner
//!   orientation points along a white-square diagonal, rotated 45 degrees
//!   from the grid axes).
//! BFS over the surviving links assigns integer lattice coordinates.

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Vector2;

use crate::detector::Corner;
use crate::params::GridGraphParams;

/// Compass direction of a link, classified in image space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkDirection {
    East,
    West,
    North,
    South,
}

impl LinkDirection {
    /// Lattice step (di, dj) for this direction; `j` grows downward.
    pub fn step(self) -> (i32, i32) {
        match self {
            LinkDirection::East => (1, 0),
            LinkDirection::West => (-1, 0),
            LinkDirection::North => (0, -1),
            LinkDirection::South => (0, 1),
        }
    }

    fn slot(self) -> usize {
        match self {
            LinkDirection::East => 0,
            LinkDirection::West => 1,
            LinkDirection::North => 2,
            LinkDirection::South => 3,
        }
    }

    fn classify(edge: &Vector2<f32>) -> Self {
        if edge.x.abs() > edge.y.abs() {
            if edge.x >= 0.0 {
                LinkDirection::East
            } else {
                LinkDirection::West
            }
        } else if edge.y >= 0.0 {
            LinkDirection::South
        } else {
            LinkDirection::North
        }
    }
}

/// One accepted link between two corners.
#[derive(Clone, Copy, Debug)]
pub struct GridLink {
    pub direction: LinkDirection,
    pub index: usize,
    pub distance: f32,
    pub score: f32,
}

/// Absolute angle difference normalized into `[0, π]`.
fn angle_diff_abs(a: f32, b: f32) -> f32 {
    let mut diff = (b - a).rem_euclid(2.0 * PI);
    if diff >= PI {
        diff -= 2.0 * PI;
    }
    diff.abs()
}

/// Angle between an undirected axis (mod π) and a directed vector angle,
/// in `[0, π/2]`.
fn axis_vec_diff(axis_angle: f32, vec_angle: f32) -> f32 {
    let mut diff = (vec_angle - axis_angle).rem_euclid(2.0 * PI);
    if diff >= PI {
        diff -= 2.0 * PI;
    }
    let diff_abs = diff.abs();
    diff_abs.min(PI - diff_abs)
}

/// Gate a kNN candidate through the spacing and orientation rules.
fn link_candidate(
    corner: &Corner,
    neighbor: &Corner,
    neighbor_index: usize,
    params: &GridGraphParams,
) -> Option<GridLink> {
    let tol = params.orientation_tolerance_deg.to_radians();

    // Diagonals of adjacent corners cross: require near-orthogonality.
    let ori_diff = angle_diff_abs(corner.orientation, neighbor.orientation);
    let ortho_err = (FRAC_PI_2 - ori_diff).abs();
    if ortho_err > tol {
        return None;
    }

    let edge = neighbor.position - corner.position;
    let distance = edge.norm();
    if distance < params.min_spacing_pix || distance > params.max_spacing_pix {
        return None;
    }

    // The edge runs along a grid axis, 45 degrees off each diagonal.
    let edge_angle = edge.y.atan2(edge.x);
    let err_here = (axis_vec_diff(corner.orientation, edge_angle) - FRAC_PI_4).abs();
    let err_there = (axis_vec_diff(neighbor.orientation, edge_angle) - FRAC_PI_4).abs();
    if err_here > tol || err_there > tol {
        return None;
    }

    Some(GridLink {
        direction: LinkDirection::classify(&edge),
        index: neighbor_index,
        distance,
        score: err_here + err_there + ortho_err,
    })
}

/// Keep the lowest-score candidate per compass direction.
fn select_links(candidates: Vec<GridLink>) -> Vec<GridLink> {
    let mut best: [Option<GridLink>; 4] = [None; 4];

    for candidate in candidates {
        let slot = &mut best[candidate.direction.slot()];
        let replace = match slot {
            None => true,
            Some(current) => {
                candidate.score < current.score
                    || (candidate.score == current.score && candidate.distance < current.distance)
            }
        };
        if replace {
            *slot = Some(candidate);
        }
    }

    best.into_iter().flatten().collect()
}

/// Per-corner link lists, indexed like the input corner slice.
pub struct GridGraph {
    pub links: Vec<Vec<GridLink>>,
}

impl GridGraph {
    /// Link corners into a 4-connected grid graph.
    pub fn build(corners: &[Corner], params: &GridGraphParams) -> Self {
        let coords: Vec<[f32; 2]> = corners
            .iter()
            .map(|c| [c.position.x, c.position.y])
            .collect();
        let tree: KdTree<f32, 2> = (&coords).into();

        let mut links = Vec::with_capacity(corners.len());
        for (i, corner) in corners.iter().enumerate() {
            let query = [corner.position.x, corner.position.y];
            let nearest = tree.nearest_n::<SquaredEuclidean>(&query, params.k_neighbors);

            let mut candidates = Vec::new();
            for nn in nearest {
                let j = nn.item as usize;
                if j == i {
                    continue;
                }
                if let Some(link) = link_candidate(corner, &corners[j], j, params) {
                    candidates.push(link);
                }
            }
            links.push(select_links(candidates));
        }

        Self { links }
    }

    /// Connected components as lists of corner indices.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.links.len()];
        let mut components = Vec::new();

        for start in 0..self.links.len() {
            if visited[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                if visited[node] {
                    continue;
                }
                visited[node] = true;
                component.push(node);
                for link in &self.links[node] {
                    if !visited[link.index] {
                        stack.push(link.index);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /// BFS lattice coordinates `(corner index, i, j)` over one component.
    ///
    /// Coordinates are relative to an arbitrary origin; directions follow
    /// [`LinkDirection::step`]. Conflicting assignments (two corners landing
    /// on one cell) are left to the lattice fit to reject.
    pub fn lattice_coords(&self, component: &[usize]) -> Vec<(usize, i32, i32)> {
        let mut coords = Vec::with_capacity(component.len());
        let mut visited = vec![false; self.links.len()];
        let mut queue = VecDeque::new();
        queue.push_back((component[0], 0, 0));

        while let Some((node, i, j)) = queue.pop_front() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            coords.push((node, i, j));

            for link in &self.links[node] {
                let (di, dj) = link.direction.step();
                queue.push_back((link.index, i + di, j + dj));
            }
        }

        coords
    }
}
