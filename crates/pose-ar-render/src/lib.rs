//! Overlay rasterization.
//!
//! Thin, dependency-light drawing over `image::RgbImage`: Bresenham lines,
//! filled circles and an embedded 5x7 bitmap font, plus the overlay renderer
//! that burns the projected synthetic object and a camera-position readout
//! into a frame. Every primitive clips per pixel, so projections that left
//! the image (or came from points behind the camera) degrade gracefully
//! instead of panicking.

mod draw;
mod font;
mod overlay;

pub use draw::{draw_filled_circle, draw_line};
pub use font::draw_text;
pub use overlay::{render_overlay, OverlayStyle};
