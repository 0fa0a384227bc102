//! Raster primitives over `image::RgbImage`.

use image::{Rgb, RgbImage};

/// Set a pixel, silently ignoring out-of-image coordinates.
#[inline]
pub(crate) fn set_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draw a line with Bresenham's algorithm.
///
/// `thickness > 1` is approximated by stamping a square brush at every step;
/// good enough for overlay edges a few pixels wide.
pub fn draw_line(
    img: &mut RgbImage,
    p0: (i64, i64),
    p1: (i64, i64),
    color: Rgb<u8>,
    thickness: u32,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let half = thickness as i64 / 2;

    loop {
        if thickness <= 1 {
            set_pixel(img, x0, y0, color);
        } else {
            for oy in -half..=half {
                for ox in -half..=half {
                    set_pixel(img, x0 + ox, y0 + oy, color);
                }
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draw a filled circle.
pub fn draw_filled_circle(img: &mut RgbImage, center: (i64, i64), radius: i64, color: Rgb<u8>) {
    let (cx, cy) = center;
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                set_pixel(img, cx + dx, cy + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn horizontal_line_covers_every_column() {
        let mut img = RgbImage::new(20, 10);
        draw_line(&mut img, (2, 5), (17, 5), WHITE, 1);
        for x in 2..=17 {
            assert_eq!(img.get_pixel(x, 5), &WHITE);
        }
        assert_eq!(img.get_pixel(1, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn diagonal_line_touches_both_endpoints() {
        let mut img = RgbImage::new(20, 20);
        draw_line(&mut img, (0, 0), (19, 19), WHITE, 1);
        assert_eq!(img.get_pixel(0, 0), &WHITE);
        assert_eq!(img.get_pixel(19, 19), &WHITE);
    }

    #[test]
    fn out_of_bounds_endpoints_are_clipped_not_fatal() {
        let mut img = RgbImage::new(10, 10);
        draw_line(&mut img, (-5, -5), (14, 14), WHITE, 3);
        draw_filled_circle(&mut img, (-3, 12), 5, WHITE);
        // The in-image part of the diagonal got painted.
        assert_eq!(img.get_pixel(5, 5), &WHITE);
    }

    #[test]
    fn filled_circle_fills_the_disk_and_not_the_corners() {
        let mut img = RgbImage::new(21, 21);
        draw_filled_circle(&mut img, (10, 10), 5, WHITE);
        assert_eq!(img.get_pixel(10, 10), &WHITE);
        assert_eq!(img.get_pixel(10, 15), &WHITE);
        assert_eq!(img.get_pixel(14, 14), &Rgb([0, 0, 0]));
    }

    #[test]
    fn thick_line_is_wider_than_one_pixel() {
        let mut img = RgbImage::new(20, 10);
        draw_line(&mut img, (2, 5), (17, 5), WHITE, 3);
        assert_eq!(img.get_pixel(10, 4), &WHITE);
        assert_eq!(img.get_pixel(10, 6), &WHITE);
    }
}
