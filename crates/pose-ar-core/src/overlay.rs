//! Synthetic overlay geometry drawn into the scene to visualize the pose.

use std::f64::consts::TAU;
use std::ops::Range;

use nalgebra::{Point2, Point3};

/// Ordered 3D overlay points in the board frame, with a structured layout.
///
/// The layout is fixed: `segments` (top, bottom) ring pairs forming the side
/// wall of a cylinder, one apex point hanging below, then `segments` smaller
/// cap-ring points. Consumers go through [`OverlayGeometry::ring_edges`],
/// [`OverlayGeometry::apex_index`] and [`OverlayGeometry::cap_indices`]
/// instead of hard-coding offsets, so the renderer cannot drift out of sync
/// with the builder.
#[derive(Clone, Debug)]
pub struct OverlayGeometry {
    points: Vec<Point3<f64>>,
    segments: usize,
}

impl OverlayGeometry {
    /// Build the stalactite-cone overlay hanging below the board plane.
    ///
    /// `center` is in board cell units; `height` and `radius` as well. The
    /// side wall spans z = 0 down to z = -0.6 * height, the apex sits a
    /// further `radius` below, and the decorative cap ring (radius scaled by
    /// 0.6) floats between wall bottom and apex. Everything is scaled by
    /// `cell_size` so the overlay shares physical units with the board
    /// corners.
    ///
    /// `segments < 3` produces a degenerate ring; callers validate upstream.
    pub fn cone(
        center: (f64, f64),
        height: f64,
        radius: f64,
        segments: usize,
        cell_size: f64,
    ) -> Self {
        let (cx, cy) = center;
        let wall_bottom = -0.6 * height;
        let mut points = Vec::with_capacity(3 * segments + 1);

        for i in 0..segments {
            let theta = TAU * i as f64 / segments as f64;
            let x = cx + radius * theta.cos();
            let y = cy + radius * theta.sin();
            points.push(Point3::new(x, y, 0.0));
            points.push(Point3::new(x, y, wall_bottom));
        }

        points.push(Point3::new(cx, cy, wall_bottom - radius));

        for i in 0..segments {
            let theta = TAU * i as f64 / segments as f64;
            let x = cx + 0.6 * radius * theta.cos();
            let y = cy + 0.6 * radius * theta.sin();
            points.push(Point3::new(x, y, wall_bottom - 0.3 * radius));
        }

        for p in &mut points {
            p.coords *= cell_size;
        }

        Self { points, segments }
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    #[inline]
    pub fn segments(&self) -> usize {
        self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index pairs of the vertical side-wall edges: (top, bottom) per segment.
    pub fn ring_edges(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.segments).map(|i| (2 * i, 2 * i + 1))
    }

    /// Index of the apex point.
    #[inline]
    pub fn apex_index(&self) -> usize {
        2 * self.segments
    }

    /// Index range of the cap-ring points.
    pub fn cap_indices(&self) -> Range<usize> {
        2 * self.segments + 1..self.points.len()
    }
}

/// Pixel projections of an [`OverlayGeometry`], same length and layout.
///
/// Valid only for the frame whose pose produced it.
#[derive(Clone, Debug)]
pub struct ProjectedOverlay {
    points: Vec<Point2<f64>>,
    segments: usize,
}

impl ProjectedOverlay {
    pub(crate) fn new(points: Vec<Point2<f64>>, segments: usize) -> Self {
        Self { points, segments }
    }

    #[inline]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    #[inline]
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Index pairs of the vertical side-wall edges: (top, bottom) per segment.
    pub fn ring_edges(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.segments).map(|i| (2 * i, 2 * i + 1))
    }

    /// Index of the apex point.
    #[inline]
    pub fn apex_index(&self) -> usize {
        2 * self.segments
    }

    /// Index range of the cap-ring points.
    pub fn cap_indices(&self) -> Range<usize> {
        2 * self.segments + 1..self.points.len()
    }
}
