//! Duotone recolouring with grayscale cut-outs for the head circle and side frames.

use image::RgbImage;
use rayon::prelude::*;

use crate::constants::GRADIENT_LEN;
use crate::geometry::point_in_triangle;
use crate::types::{BoundingCircle, Point2D};

/// Black-to-brand-colour lookup table indexed by luminance.
///
/// Built once; read-only afterwards, so it can be shared across frames and
/// threads freely.
#[derive(Debug, Clone, PartialEq)]
pub struct DuotoneGradient {
    colors: [[u8; 3]; GRADIENT_LEN],
}

impl DuotoneGradient {
    pub fn new(brand: [u8; 3]) -> Self {
        let mut colors = [[0u8; 3]; GRADIENT_LEN];
        for (i, c) in colors.iter_mut().enumerate() {
            for k in 0..3 {
                // integer division floors
                c[k] = (brand[k] as u32 * i as u32 / 255) as u8;
            }
        }
        Self { colors }
    }

    pub fn get(&self, index: usize) -> [u8; 3] {
        self.colors[index.min(GRADIENT_LEN - 1)]
    }
}

/// Luma coding (0.3, 0.59, 0.11), truncated into the gradient's index range.
#[inline]
pub fn luminance_index(r: u8, g: u8, b: u8) -> usize {
    let l = 0.3 * r as f32 + 0.59 * g as f32 + 0.11 * b as f32;
    (l as usize).min(GRADIENT_LEN - 1)
}

/// Regions that stay grayscale while a face is tracked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMask {
    pub circle: BoundingCircle,
    pub left: [Point2D; 3],
    pub right: [Point2D; 3],
}

impl FrameMask {
    /// Side frames run from the screen corners to the circle's horizontal extremes.
    pub fn new(circle: BoundingCircle, width: f32, height: f32) -> Self {
        let c = circle.center;
        let r = circle.radius;
        Self {
            circle,
            left: [
                Point2D::new(0.0, 0.0),
                Point2D::new(c.x - r, c.y),
                Point2D::new(0.0, height),
            ],
            right: [
                Point2D::new(width, 0.0),
                Point2D::new(c.x + r, c.y),
                Point2D::new(width, height),
            ],
        }
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        if self.circle.contains(x, y) {
            return true;
        }
        let s = Point2D::new(x, y);
        point_in_triangle(s, self.left[0], self.left[1], self.left[2])
            || point_in_triangle(s, self.right[0], self.right[1], self.right[2])
    }
}

/// Recolours `frame` in place. `mask` is `None` when no face was found, in
/// which case the whole frame takes the gradient.
pub fn composite_in_place(frame: &mut RgbImage, mask: Option<&FrameMask>, gradient: &DuotoneGradient) {
    let width = frame.width() as usize;
    if width == 0 {
        return;
    }
    let stride = width * 3;

    frame
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(j, row)| {
            let y = j as f32;
            for (i, px) in row.chunks_exact_mut(3).enumerate() {
                let l = luminance_index(px[0], px[1], px[2]);
                let color = match mask {
                    Some(m) if m.contains(i as f32, y) => [l as u8; 3],
                    _ => gradient.get(l),
                };
                px.copy_from_slice(&color);
            }
        });
}

pub fn composite(frame: &RgbImage, mask: Option<&FrameMask>, gradient: &DuotoneGradient) -> RgbImage {
    let mut out = frame.clone();
    composite_in_place(&mut out, mask, gradient);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn brand() -> DuotoneGradient {
        DuotoneGradient::new([255, 70, 47])
    }

    fn mask() -> FrameMask {
        let circle = BoundingCircle {
            center: Point2D::new(32.0, 30.0),
            radius: 10.0,
        };
        FrameMask::new(circle, 64.0, 48.0)
    }

    #[test]
    fn gradient_runs_black_to_brand() {
        let g = brand();
        assert_eq!(g.get(0), [0, 0, 0]);
        assert_eq!(g.get(254), [254, 69, 46]);
        assert_eq!(g.get(128), [128, 35, 23]);
        assert_eq!(g.get(9999), g.get(254));
    }

    #[test]
    fn white_stays_in_table_range() {
        assert_eq!(luminance_index(255, 255, 255), 254);
        assert_eq!(luminance_index(0, 0, 0), 0);
        assert_eq!(luminance_index(0, 0, 255), 28);
    }

    #[test]
    fn no_face_recolours_everything() {
        let g = brand();
        let src = RgbImage::from_fn(16, 8, |x, y| Rgb([(x * 16) as u8, (y * 30) as u8, 77]));
        let out = composite(&src, None, &g);
        for (x, y, px) in out.enumerate_pixels() {
            let s = src.get_pixel(x, y);
            assert_eq!(px.0, g.get(luminance_index(s[0], s[1], s[2])));
        }
    }

    #[test]
    fn masked_regions_turn_gray() {
        let g = brand();
        let src = RgbImage::from_pixel(64, 48, Rgb([200, 120, 40]));
        let l = luminance_index(200, 120, 40) as u8;
        let out = composite(&src, Some(&mask()), &g);

        // inside circle
        assert_eq!(out.get_pixel(32, 30).0, [l, l, l]);
        // inside left frame
        assert_eq!(out.get_pixel(1, 24).0, [l, l, l]);
        // inside right frame
        assert_eq!(out.get_pixel(62, 24).0, [l, l, l]);
        // top middle, outside everything
        assert_eq!(out.get_pixel(32, 2).0, g.get(l as usize));
    }

    #[test]
    fn gradient_pass_is_not_idempotent() {
        let g = brand();
        let src = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        let once = composite(&src, None, &g);
        assert_eq!(once.get_pixel(0, 0).0, [254, 69, 46]);

        // luminance of gradient[254] recomputes to 121, not 254
        let twice = composite(&once, None, &g);
        assert_eq!(luminance_index(254, 69, 46), 121);
        assert_eq!(twice.get_pixel(0, 0).0, g.get(121));
        assert_ne!(twice, once);
    }

    #[test]
    fn empty_frame_is_untouched() {
        let mut img = RgbImage::new(0, 0);
        composite_in_place(&mut img, None, &brand());
        assert_eq!(img.dimensions(), (0, 0));
    }
}
