//! Burn the projected overlay and camera readout into a frame.

use image::{Rgb, RgbImage};
use nalgebra::{Point2, Vector3};

use pose_ar_core::ProjectedOverlay;

use crate::draw::{draw_filled_circle, draw_line};
use crate::font::draw_text;

/// Colors, sizes and the readout anchor for [`render_overlay`].
#[derive(Clone, Copy, Debug)]
pub struct OverlayStyle {
    pub edge_color: Rgb<u8>,
    pub apex_color: Rgb<u8>,
    pub cap_color: Rgb<u8>,
    pub text_color: Rgb<u8>,
    pub edge_thickness: u32,
    pub apex_radius: i64,
    pub cap_radius: i64,
    pub text_anchor: (i64, i64),
    pub text_scale: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            edge_color: Rgb([0, 200, 255]),
            apex_color: Rgb([255, 100, 0]),
            cap_color: Rgb([255, 100, 100]),
            text_color: Rgb([0, 255, 0]),
            edge_thickness: 2,
            apex_radius: 5,
            cap_radius: 2,
            text_anchor: (10, 12),
            text_scale: 2,
        }
    }
}

/// Round a projected point to raster coordinates.
///
/// Non-finite projections (points at or behind the camera center) are
/// dropped; finite but far-out coordinates are clamped to a window around
/// the image so Bresenham stepping stays cheap while clipped edges keep
/// roughly the right direction.
fn raster_point(p: &Point2<f64>, img: &RgbImage) -> Option<(i64, i64)> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return None;
    }
    let margin = 4 * img.width().max(img.height()) as i64;
    let x = (p.x.round() as i64).clamp(-margin, margin);
    let y = (p.y.round() as i64).clamp(-margin, margin);
    Some((x, y))
}

/// Draw the projected overlay edges, markers and the camera-position
/// readout onto `img` in place.
///
/// The drawing plan follows the overlay's structured layout: one line per
/// ring (top, bottom) pair, a large filled marker at the apex, a small dot
/// per cap point, then `XYZ: [x y z]` with three decimals.
pub fn render_overlay(
    img: &mut RgbImage,
    overlay: &ProjectedOverlay,
    camera_position: &Vector3<f64>,
    style: &OverlayStyle,
) {
    let points = overlay.points();

    for (top, bottom) in overlay.ring_edges() {
        let (Some(p0), Some(p1)) = (
            raster_point(&points[top], img),
            raster_point(&points[bottom], img),
        ) else {
            continue;
        };
        draw_line(img, p0, p1, style.edge_color, style.edge_thickness);
    }

    if let Some(apex) = raster_point(&points[overlay.apex_index()], img) {
        draw_filled_circle(img, apex, style.apex_radius, style.apex_color);
    }

    for i in overlay.cap_indices() {
        if let Some(p) = raster_point(&points[i], img) {
            draw_filled_circle(img, p, style.cap_radius, style.cap_color);
        }
    }

    let readout = format!(
        "XYZ: [{:.3} {:.3} {:.3}]",
        camera_position.x, camera_position.y, camera_position.z
    );
    let (tx, ty) = style.text_anchor;
    draw_text(img, tx, ty, &readout, style.text_color, style.text_scale);
}
