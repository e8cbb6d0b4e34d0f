//! Overlay primitives produced each frame and the routines that draw them.

use image::{Rgb, RgbImage};

use crate::compositor::FrameMask;
use crate::constants::MESH_SUBDIVISIONS;
use crate::geometry::point_in_triangle;
use crate::glyphs::{draw_text_line, line_height, measure_text_width};
use crate::text::{Glyph, GlyphQuad};
use crate::tracker::OPEN_MOUTH;
use crate::types::{BoundingCircle, Direction, Point2D};
use crate::warp::{warp_texture, Quad};

/// Everything the presentation layer needs to draw on top of the composited frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayPrimitives {
    pub circle: Option<BoundingCircle>,
    pub frames: Option<FrameMask>,
    pub cone: Option<[Point2D; 3]>,
    pub guide_segments: Vec<(Point2D, Point2D)>,
    pub glyph_quads: Vec<GlyphQuad>,
}

impl OverlayPrimitives {
    pub fn is_empty(&self) -> bool {
        self.circle.is_none()
            && self.frames.is_none()
            && self.cone.is_none()
            && self.guide_segments.is_empty()
            && self.glyph_quads.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLines {
    pub mouth: String,
    pub direction: String,
}

impl StatusLines {
    pub fn new(found: bool, expression: Option<&str>, direction: Direction) -> Self {
        Self {
            mouth: mouth_status(found, expression),
            direction: direction_status(direction),
        }
    }

    pub fn lines(&self) -> [&str; 2] {
        [self.mouth.as_str(), self.direction.as_str()]
    }
}

pub fn mouth_status(found: bool, expression: Option<&str>) -> String {
    if !found {
        return "mouth not detected".to_string();
    }
    let state = if expression == Some(OPEN_MOUTH) {
        "open"
    } else {
        "closed"
    };
    format!("mouth state = {}", state)
}

pub fn direction_status(direction: Direction) -> String {
    format!("direction facing = {}", direction.label())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub line_width: f32,
    pub line_color: [u8; 3],
    pub cone_color: [u8; 3],
    pub glyph_color: [u8; 3],
    pub status_scale: u32,
    pub show_frames: bool,
    pub show_callout: bool,
    pub show_status: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_width: 5.0,
            line_color: [255, 255, 255],
            cone_color: crate::constants::DEFAULT_BRAND_COLOR,
            glyph_color: crate::constants::DEFAULT_GLYPH_COLOR,
            status_scale: 2,
            show_frames: true,
            show_callout: true,
            show_status: true,
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn stamp(img: &mut RgbImage, c: Point2D, radius: f32, color: [u8; 3]) {
    let r = radius.max(0.5);
    let r_sq = r * r;
    let (x0, x1) = ((c.x - r).floor() as i64, (c.x + r).ceil() as i64);
    let (y0, y1) = ((c.y - r).floor() as i64, (c.y + r).ceil() as i64);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - c.x;
            let dy = y as f32 + 0.5 - c.y;
            if dx * dx + dy * dy <= r_sq {
                put(img, x, y, color);
            }
        }
    }
}

/// Thick segment, stamped at half-pixel steps.
pub fn draw_line(img: &mut RgbImage, a: Point2D, b: Point2D, width: f32, color: [u8; 3]) {
    // Clamp far-off endpoints so extended guide lines stay cheap to stroke.
    let limit = (img.width().max(img.height()) as f32) * 4.0;
    let clamp = |p: Point2D| Point2D::new(p.x.clamp(-limit, limit), p.y.clamp(-limit, limit));
    let (a, b) = (clamp(a), clamp(b));

    let steps = (a.distance(b) * 2.0).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp(img, a.lerp(b, t), width / 2.0, color);
    }
}

pub fn draw_circle_outline(img: &mut RgbImage, circle: &BoundingCircle, width: f32, color: [u8; 3]) {
    let half = width / 2.0;
    let outer = circle.radius + half;
    let inner = (circle.radius - half).max(0.0);
    let c = circle.center;

    let x0 = ((c.x - outer).floor() as i64).max(0);
    let x1 = ((c.x + outer).ceil() as i64).min(img.width() as i64 - 1);
    let y0 = ((c.y - outer).floor() as i64).max(0);
    let y1 = ((c.y + outer).ceil() as i64).min(img.height() as i64 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = Point2D::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
            if d >= inner && d <= outer {
                put(img, x, y, color);
            }
        }
    }
}

pub fn draw_triangle_outline(img: &mut RgbImage, tri: &[Point2D; 3], width: f32, color: [u8; 3]) {
    draw_line(img, tri[0], tri[1], width, color);
    draw_line(img, tri[1], tri[2], width, color);
    draw_line(img, tri[2], tri[0], width, color);
}

pub fn fill_triangle(img: &mut RgbImage, tri: &[Point2D; 3], color: [u8; 3]) {
    let [a, b, c] = *tri;
    let x0 = (a.x.min(b.x).min(c.x).floor() as i64).max(0);
    let x1 = (a.x.max(b.x).max(c.x).ceil() as i64).min(img.width() as i64 - 1);
    let y0 = (a.y.min(b.y).min(c.y).floor() as i64).max(0);
    let y1 = (a.y.max(b.y).max(c.y).ceil() as i64).min(img.height() as i64 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            if point_in_triangle(Point2D::new(x as f32, y as f32), a, b, c) {
                put(img, x, y, color);
            }
        }
    }
}

/// Black boxes with white text, stacked from the top-left corner.
pub fn draw_status(img: &mut RgbImage, status: &StatusLines, scale: u32) {
    let pad = scale.max(1) * 2;
    let box_h = line_height(scale) + pad;
    let mut y = 10;

    for text in status.lines() {
        let box_w = measure_text_width(text, scale) + pad * 2;
        for by in y..(y + box_h) {
            for bx in 5..(5 + box_w) {
                put(img, bx as i64, by as i64, [0, 0, 0]);
            }
        }
        draw_text_line(img, 5 + pad, y + pad, text, [255, 255, 255], scale);
        y += box_h + 5;
    }
}

/// Draws glyph quads with textures from `glyphs`.
pub fn draw_glyphs(img: &mut RgbImage, quads: &[GlyphQuad], glyphs: &[Glyph], color: [u8; 3]) {
    for q in quads {
        let Some(glyph) = glyphs.get(q.glyph) else {
            continue;
        };
        warp_texture(
            img,
            &glyph.image,
            &Quad::from_glyph_quad(q),
            MESH_SUBDIVISIONS,
            MESH_SUBDIVISIONS,
            color,
        );
    }
}

/// Frames and circle first, then the cone, label lines and glyphs on top.
pub fn draw_overlay(
    img: &mut RgbImage,
    prims: &OverlayPrimitives,
    glyphs: &[Glyph],
    style: &OverlayStyle,
) {
    if style.show_frames {
        if let Some(frames) = &prims.frames {
            draw_triangle_outline(img, &frames.left, style.line_width, style.line_color);
            draw_triangle_outline(img, &frames.right, style.line_width, style.line_color);
        }
        if let Some(circle) = &prims.circle {
            draw_circle_outline(img, circle, style.line_width, style.line_color);
        }
    }

    if style.show_callout {
        if let Some(cone) = &prims.cone {
            fill_triangle(img, cone, style.cone_color);
        }
        for (a, b) in &prims.guide_segments {
            draw_line(img, *a, *b, style.line_width, style.line_color);
        }
        draw_glyphs(img, &prims.glyph_quads, glyphs, style.glyph_color);
    }
}
