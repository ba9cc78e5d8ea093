//! Brush outline - a midpoint-circle ring around the cursor.

use crate::core::color::Rgba;

use super::compositor::OverlayPixel;

/// Cursor ring color.
const OUTLINE_COLOR: Rgba = Rgba::new(227, 227, 227, 180);

/// Midpoint-circle outline around `(cx, cy)` in sim space, emitted as
/// image-space overlay pixels clipped to the canvas. Each step mirrors the
/// octant point across both axes for itself and its swapped twin. Radius
/// zero marks the single center pixel.
pub fn circle_outline(cx: i32, cy: i32, radius: i32, width: i32, height: i32) -> Vec<OverlayPixel> {
    let mut pixels = Vec::new();
    let mut push = |x: i32, y: i32| {
        if x < 0 || y < 0 || x >= width || y >= height {
            return;
        }
        let index = ((height - 1 - y) * width + x) as usize;
        let px = OverlayPixel {
            index,
            color: OUTLINE_COLOR,
        };
        if !pixels.contains(&px) {
            pixels.push(px);
        }
    };

    if radius <= 0 {
        push(cx, cy);
        return pixels;
    }

    let mut x = radius;
    let mut y = 0;
    let mut p = 0;
    while y < x {
        y += 1;
        if p < 0 {
            p += 2 * y + 1;
        } else {
            x -= 1;
            p += 2 * (y - x) + 1;
        }
        for (ox, oy) in [(x, y), (y, x)] {
            for sx in [-1, 1] {
                for sy in [1, -1] {
                    push(cx + sx * ox, cy + sy * oy);
                }
            }
        }
    }
    pixels
}
