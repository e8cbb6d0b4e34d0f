//! Glyph textures for the scrolling text, plus a tiny bitmap font for status lines.

use image::{GrayImage, Luma, Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{OverlayError, Result};
use crate::text::Glyph;

pub trait GlyphRasterizer {
    fn name(&self) -> String;

    /// One texture per drawable character; blanks are skipped but keep
    /// their index in the string.
    fn rasterize(&self, text: &str) -> Vec<Glyph>;
}

pub struct TrueTypeGlyphs {
    font: Font<'static>,
    size_px: f32,
    source: String,
}

impl TrueTypeGlyphs {
    /// Looks for `<family>.ttf` in the usual macOS/Linux font folders and
    /// the working directory.
    pub fn try_load(family: &str, size_px: f32) -> Option<Self> {
        let paths = [
            format!("/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/Supplemental/{}.ttf", family),
            format!("/usr/share/fonts/truetype/{}.ttf", family),
            format!("{}.ttf", family),
        ];

        for p in paths.iter() {
            if !Path::new(p).exists() {
                continue;
            }
            match fs::read(p)
                .map_err(OverlayError::from)
                .and_then(|data| Self::from_bytes(data, size_px, p))
            {
                Ok(glyphs) => {
                    info!("Loaded font from {}", p);
                    return Some(glyphs);
                }
                Err(e) => warn!("Skipping font {}: {}", p, e),
            }
        }

        warn!("Could not find font family '{}'", family);
        None
    }

    pub fn from_bytes(data: Vec<u8>, size_px: f32, source: &str) -> Result<Self> {
        let font = Font::try_from_vec(data)
            .ok_or_else(|| OverlayError::Font(format!("{} is not a TrueType font", source)))?;
        Ok(Self {
            font,
            size_px,
            source: source.to_string(),
        })
    }
}

impl GlyphRasterizer for TrueTypeGlyphs {
    fn name(&self) -> String {
        format!("TrueType ({}, {}px)", self.source, self.size_px)
    }

    fn rasterize(&self, text: &str) -> Vec<Glyph> {
        let scale = Scale::uniform(self.size_px);
        let mut glyphs = Vec::new();

        for (index, ch) in text.chars().enumerate() {
            let positioned = self.font.glyph(ch).scaled(scale).positioned(point(0.0, 0.0));
            let Some(bb) = positioned.pixel_bounding_box() else {
                continue;
            };
            if bb.width() <= 0 || bb.height() <= 0 {
                continue;
            }

            let mut image = GrayImage::new(bb.width() as u32, bb.height() as u32);
            positioned.draw(|x, y, v| {
                if x < image.width() && y < image.height() {
                    image.put_pixel(x, y, Luma([(v * 255.0).round().min(255.0) as u8]));
                }
            });
            glyphs.push(Glyph { index, ch, image });
        }
        glyphs
    }
}

/// 3x5 cell bitmap; each row holds 3 bits, leftmost column in bit 2.
fn bitmap(c: char) -> Option<[u8; 5]> {
    let map = match c.to_ascii_uppercase() {
        ' ' => return None,
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x7, 0x4, 0x4, 0x4, 0x7],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x7, 0x4, 0x5, 0x5, 0x7],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x7],
        'K' => [0x5, 0x5, 0x6, 0x5, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x7, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x7, 0x5, 0x5, 0x5, 0x7],
        'P' => [0x7, 0x5, 0x7, 0x4, 0x4],
        'Q' => [0x7, 0x5, 0x5, 0x7, 0x1],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6],
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x7, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        '=' => [0x0, 0x7, 0x0, 0x7, 0x0],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        ',' => [0x0, 0x0, 0x0, 0x2, 0x4],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '!' => [0x2, 0x2, 0x2, 0x0, 0x2],
        '?' => [0x7, 0x1, 0x2, 0x0, 0x2],
        '|' => [0x2, 0x2, 0x2, 0x2, 0x2],
        '/' => [0x1, 0x1, 0x2, 0x4, 0x4],
        '(' => [0x2, 0x4, 0x4, 0x4, 0x2],
        ')' => [0x2, 0x1, 0x1, 0x1, 0x2],
        '[' => [0x7, 0x4, 0x4, 0x4, 0x7],
        ']' => [0x7, 0x1, 0x1, 0x1, 0x7],
        _ => [0x7, 0x7, 0x7, 0x7, 0x7], // block
    };
    Some(map)
}

fn lit(bits: u8, col: usize) -> bool {
    (bits >> (2 - col)) & 1 == 1
}

/// Fallback when no TrueType font is available.
pub struct BitmapGlyphs {
    scale: u32,
}

impl BitmapGlyphs {
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
        }
    }

    /// Scale that makes the 5-row cell roughly `size_px` tall.
    pub fn for_size(size_px: f32) -> Self {
        Self::new((size_px / 5.0).round().max(1.0) as u32)
    }
}

impl GlyphRasterizer for BitmapGlyphs {
    fn name(&self) -> String {
        format!("Bitmap 3x5 (x{})", self.scale)
    }

    fn rasterize(&self, text: &str) -> Vec<Glyph> {
        let s = self.scale;
        text.chars()
            .enumerate()
            .filter_map(|(index, ch)| {
                let rows = bitmap(ch)?;
                let image = GrayImage::from_fn(3 * s, 5 * s, |x, y| {
                    let (col, row) = ((x / s) as usize, (y / s) as usize);
                    if lit(rows[row], col) {
                        Luma([255])
                    } else {
                        Luma([0])
                    }
                });
                Some(Glyph { index, ch, image })
            })
            .collect()
    }
}

/// TrueType when the family resolves, bitmap otherwise.
pub fn load_rasterizer(family: &str, size_px: f32) -> Box<dyn GlyphRasterizer> {
    match TrueTypeGlyphs::try_load(family, size_px) {
        Some(ttf) => Box::new(ttf),
        None => {
            warn!("Falling back to bitmap glyphs");
            Box::new(BitmapGlyphs::for_size(size_px))
        }
    }
}

pub fn measure_text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * (4 * scale)
}

pub fn line_height(scale: u32) -> u32 {
    7 * scale
}

/// Draws `text` with the bitmap font, clipped to the image.
pub fn draw_text_line(buffer: &mut RgbImage, x: u32, y: u32, text: &str, color: [u8; 3], scale: u32) {
    let scale = scale.max(1);
    let mut cx = x;
    for c in text.chars() {
        if let Some(rows) = bitmap(c) {
            draw_char(buffer, cx, y, &rows, color, scale);
        }
        cx += 4 * scale; // 3 wide + 1 spacing
    }
}

fn draw_char(buffer: &mut RgbImage, x: u32, y: u32, rows: &[u8; 5], color: [u8; 3], scale: u32) {
    let (width, height) = buffer.dimensions();
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..3 {
            if !lit(*bits, col) {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col as u32 * scale + dx;
                    let py = y + row as u32 * scale + dy;
                    if px < width && py < height {
                        buffer.put_pixel(px, py, Rgb(color));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_glyphs_skip_blanks_but_keep_indices() {
        let glyphs = BitmapGlyphs::new(2).rasterize("HE LO");
        let indices: Vec<usize> = glyphs.iter().map(|g| g.index).collect();
        assert_eq!(indices, vec![0, 1, 3, 4]);
        assert!(glyphs.iter().all(|g| g.width() == 6 && g.height() == 10));
    }

    #[test]
    fn bitmap_h_has_open_top_middle() {
        let glyphs = BitmapGlyphs::new(1).rasterize("H");
        let h = &glyphs[0].image;
        assert_eq!(h.get_pixel(0, 0)[0], 255);
        assert_eq!(h.get_pixel(1, 0)[0], 0);
        assert_eq!(h.get_pixel(1, 2)[0], 255);
    }

    #[test]
    fn scale_follows_requested_size() {
        let glyphs = BitmapGlyphs::for_size(120.0).rasterize("A");
        assert_eq!(glyphs[0].height(), 120);
        assert_eq!(glyphs[0].width(), 72);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let res = TrueTypeGlyphs::from_bytes(vec![0, 1, 2, 3], 32.0, "junk");
        assert!(matches!(res, Err(OverlayError::Font(_))));
    }

    #[test]
    fn text_line_is_clipped() {
        let mut img = RgbImage::new(10, 4);
        draw_text_line(&mut img, 6, 0, "MM", [255, 255, 255], 1);
        // first M's left column
        assert_eq!(img.get_pixel(6, 0).0, [255, 255, 255]);
        // M's middle column is blank on the top row
        assert_eq!(img.get_pixel(7, 0).0, [0, 0, 0]);
        assert_eq!(measure_text_width("MM", 1), 8);
    }
}
