//! Piecewise-linear stand-in for a projective texture warp.
//!
//! The destination quad and the source rectangle are both split into the
//! same grid; each cell is drawn as two triangles with affine texture
//! mapping. At 40x40 cells the seams are invisible for glyph-sized quads.

use image::{GrayImage, RgbImage};

use crate::text::GlyphQuad;
use crate::types::Point2D;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_right: Point2D,
    pub bottom_left: Point2D,
}

impl Quad {
    /// Glyph top faces the apex; line B is on the glyph's left.
    pub fn from_glyph_quad(q: &GlyphQuad) -> Self {
        Self {
            top_left: q.start_b,
            top_right: q.start_a,
            bottom_right: q.end_a,
            bottom_left: q.end_b,
        }
    }

    pub fn axis_aligned(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            top_left: Point2D::new(x, y),
            top_right: Point2D::new(x + w, y),
            bottom_right: Point2D::new(x + w, y + h),
            bottom_left: Point2D::new(x, y + h),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WarpMesh {
    pub rows: usize,
    pub cols: usize,
    pub vertices: Vec<Point2D>,
    pub tex_coords: Vec<Point2D>,
    pub triangles: Vec<[usize; 3]>,
}

impl WarpMesh {
    pub fn build(quad: &Quad, tex_width: f32, tex_height: f32, rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);

        let mut vertices = Vec::with_capacity((rows + 1) * (cols + 1));
        let mut tex_coords = Vec::with_capacity((rows + 1) * (cols + 1));

        for y in 0..=rows {
            let fy = y as f32 / rows as f32;
            let v_left = quad.top_left.lerp(quad.bottom_left, fy);
            let v_right = quad.top_right.lerp(quad.bottom_right, fy);
            let t_left = Point2D::new(0.0, tex_height * fy);
            let t_right = Point2D::new(tex_width, tex_height * fy);

            for x in 0..=cols {
                let fx = x as f32 / cols as f32;
                vertices.push(v_left.lerp(v_right, fx));
                tex_coords.push(t_left.lerp(t_right, fx));
            }
        }

        let index = |x: usize, y: usize| y * (cols + 1) + x;
        let mut triangles = Vec::with_capacity(rows * cols * 2);
        for y in 0..rows {
            for x in 0..cols {
                triangles.push([index(x, y), index(x + 1, y), index(x, y + 1)]);
                triangles.push([index(x + 1, y), index(x + 1, y + 1), index(x, y + 1)]);
            }
        }

        Self {
            rows,
            cols,
            vertices,
            tex_coords,
            triangles,
        }
    }

    pub fn vertex(&self, x: usize, y: usize) -> Option<Point2D> {
        if x > self.cols || y > self.rows {
            return None;
        }
        self.vertices.get(y * (self.cols + 1) + x).copied()
    }
}

fn edge(a: Point2D, b: Point2D, p: Point2D) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Tints `target` with `color`, using the glyph's coverage as alpha.
pub fn draw_mesh(target: &mut RgbImage, texture: &GrayImage, mesh: &WarpMesh, color: [u8; 3]) {
    let (tw, th) = texture.dimensions();
    if tw == 0 || th == 0 {
        return;
    }
    let (w, h) = (target.width() as i64, target.height() as i64);

    for tri in &mesh.triangles {
        let [a, b, c] = tri.map(|i| mesh.vertices[i]);
        let [ta, tb, tc] = tri.map(|i| mesh.tex_coords[i]);

        let area = edge(a, b, c);
        if area.abs() <= f32::EPSILON {
            continue;
        }

        let min_x = (a.x.min(b.x).min(c.x).floor() as i64).max(0);
        let max_x = (a.x.max(b.x).max(c.x).ceil() as i64).min(w - 1);
        let min_y = (a.y.min(b.y).min(c.y).floor() as i64).max(0);
        let max_y = (a.y.max(b.y).max(c.y).ceil() as i64).min(h - 1);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let p = Point2D::new(px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let u = ta.x * w0 + tb.x * w1 + tc.x * w2;
                let v = ta.y * w0 + tb.y * w1 + tc.y * w2;
                let sx = (u.max(0.0) as u32).min(tw - 1);
                let sy = (v.max(0.0) as u32).min(th - 1);

                let coverage = texture.get_pixel(sx, sy)[0];
                if coverage == 0 {
                    continue;
                }
                let alpha = coverage as f32 / 255.0;
                let dst = target.get_pixel_mut(px as u32, py as u32);
                for k in 0..3 {
                    dst[k] = (dst[k] as f32 * (1.0 - alpha) + color[k] as f32 * alpha).round() as u8;
                }
            }
        }
    }
}

/// Warps `texture` onto `quad` through a `rows` x `cols` mesh.
pub fn warp_texture(
    target: &mut RgbImage,
    texture: &GrayImage,
    quad: &Quad,
    rows: usize,
    cols: usize,
    color: [u8; 3],
) {
    let mesh = WarpMesh::build(
        quad,
        texture.width() as f32,
        texture.height() as f32,
        rows,
        cols,
    );
    draw_mesh(target, texture, &mesh, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn mesh_has_expected_topology() {
        let quad = Quad::axis_aligned(0.0, 0.0, 40.0, 40.0);
        let mesh = WarpMesh::build(&quad, 8.0, 10.0, 40, 40);
        assert_eq!(mesh.vertices.len(), 41 * 41);
        assert_eq!(mesh.tex_coords.len(), 41 * 41);
        assert_eq!(mesh.triangles.len(), 2 * 40 * 40);
    }

    #[test]
    fn mesh_corners_match_quad_and_texture() {
        let quad = Quad {
            top_left: Point2D::new(10.0, 10.0),
            top_right: Point2D::new(50.0, 14.0),
            bottom_right: Point2D::new(60.0, 70.0),
            bottom_left: Point2D::new(0.0, 60.0),
        };
        let mesh = WarpMesh::build(&quad, 8.0, 10.0, 4, 4);
        assert_eq!(mesh.vertex(0, 0), Some(quad.top_left));
        assert_eq!(mesh.vertex(4, 0), Some(quad.top_right));
        assert_eq!(mesh.vertex(4, 4), Some(quad.bottom_right));
        assert_eq!(mesh.vertex(0, 4), Some(quad.bottom_left));
        assert_eq!(mesh.tex_coords[0], Point2D::new(0.0, 0.0));
        assert_eq!(*mesh.tex_coords.last().unwrap(), Point2D::new(8.0, 10.0));
        assert!(mesh.vertex(5, 0).is_none());
    }

    #[test]
    fn center_vertex_is_bilinear_midpoint() {
        let quad = Quad {
            top_left: Point2D::new(0.0, 0.0),
            top_right: Point2D::new(20.0, 0.0),
            bottom_right: Point2D::new(40.0, 20.0),
            bottom_left: Point2D::new(-10.0, 20.0),
        };
        let mesh = WarpMesh::build(&quad, 1.0, 1.0, 2, 2);
        let mid = mesh.vertex(1, 1).unwrap();
        assert!((mid.x - 12.5).abs() < 1e-4);
        assert!((mid.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn solid_glyph_fills_its_quad() {
        let mut target = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
        let glyph = GrayImage::from_pixel(4, 4, Luma([255]));
        let quad = Quad::axis_aligned(10.0, 10.0, 20.0, 20.0);
        warp_texture(&mut target, &glyph, &quad, 40, 40, [49, 48, 44]);

        assert_eq!(target.get_pixel(20, 20).0, [49, 48, 44]);
        assert_eq!(target.get_pixel(11, 28).0, [49, 48, 44]);
        assert_eq!(target.get_pixel(5, 5).0, [255, 255, 255]);
        assert_eq!(target.get_pixel(35, 20).0, [255, 255, 255]);
    }

    #[test]
    fn texture_orientation_is_preserved() {
        // left half opaque, right half clear
        let glyph = GrayImage::from_fn(4, 4, |x, _| if x < 2 { Luma([255]) } else { Luma([0]) });
        let mut target = RgbImage::new(40, 40);
        let quad = Quad::axis_aligned(0.0, 0.0, 40.0, 40.0);
        warp_texture(&mut target, &glyph, &quad, 8, 8, [200, 10, 10]);

        assert_eq!(target.get_pixel(5, 20).0, [200, 10, 10]);
        assert_eq!(target.get_pixel(35, 20).0, [0, 0, 0]);
    }

    #[test]
    fn quads_off_screen_are_clipped() {
        let mut target = RgbImage::new(10, 10);
        let glyph = GrayImage::from_pixel(2, 2, Luma([255]));
        let quad = Quad::axis_aligned(-50.0, -50.0, 20.0, 20.0);
        warp_texture(&mut target, &glyph, &quad, 4, 4, [255, 0, 0]);
        assert!(target.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
