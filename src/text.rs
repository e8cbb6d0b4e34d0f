//! Glyph ticker scrolling outward along the callout's guide lines.
//!
//! Two passes ("leading" and "trailing") take turns so the stream never
//! visibly stops. Each pass places its glyphs by a parameter measured in
//! triangle heights: 0 is the apex, 1 the edge vertex, and anything past 1
//! runs along the extension at the same on-screen spacing.

use image::GrayImage;
use tracing::debug;

use crate::callout::{Callout, GuideLine};
use crate::constants::{GLYPH_SPACING, GLYPH_WIDTH_FRACTION, TRAVERSAL_SECONDS};
use crate::types::Point2D;

/// One character's coverage texture.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Position in the display string.
    pub index: usize,
    pub ch: char,
    pub image: GrayImage,
}

impl Glyph {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Leading,
    Trailing,
}

impl Pass {
    pub fn other(self) -> Pass {
        match self {
            Pass::Leading => Pass::Trailing,
            Pass::Trailing => Pass::Leading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub leading: f32,
    pub trailing: f32,
    pub leading_active: bool,
    pub trailing_active: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            leading: 0.0,
            trailing: 0.0,
            leading_active: true,
            trailing_active: false,
        }
    }
}

impl ScrollState {
    pub fn timer(&self, pass: Pass) -> f32 {
        match pass {
            Pass::Leading => self.leading,
            Pass::Trailing => self.trailing,
        }
    }

    pub fn is_active(&self, pass: Pass) -> bool {
        match pass {
            Pass::Leading => self.leading_active,
            Pass::Trailing => self.trailing_active,
        }
    }

    fn timer_mut(&mut self, pass: Pass) -> &mut f32 {
        match pass {
            Pass::Leading => &mut self.leading,
            Pass::Trailing => &mut self.trailing,
        }
    }

    fn set_active(&mut self, pass: Pass, active: bool) {
        match pass {
            Pass::Leading => self.leading_active = active,
            Pass::Trailing => self.trailing_active = active,
        }
    }
}

/// The two guide lines glyphs travel along.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPath<'a> {
    pub line_a: &'a GuideLine,
    pub line_b: &'a GuideLine,
    pub triangle_height: f32,
}

impl<'a> ScrollPath<'a> {
    pub fn from_callout(callout: &'a Callout) -> Self {
        Self {
            line_a: &callout.line_a,
            line_b: &callout.line_b,
            triangle_height: callout.triangle_height,
        }
    }
}

/// Maps a parameter past the edge vertex onto an extension of length `span`
/// so that one unit still covers one triangle height on screen.
pub fn remap_param(param: f32, triangle_height: f32, span: f32) -> f32 {
    if param <= 1.0 || span <= f32::EPSILON {
        return param;
    }
    let length = (param - 1.0) * triangle_height;
    1.0 + length / span
}

/// Point on `line` at `param` triangle heights from the apex.
pub fn locate(line: &GuideLine, param: f32, triangle_height: f32) -> Option<Point2D> {
    if param <= 1.0 {
        return line.point_at(param);
    }
    let edge = line.edge_vertex()?;
    match line.extended_vertex() {
        Some(ext) => line.point_at(remap_param(param, triangle_height, edge.distance(ext))),
        None => Some(edge + line.direction()? * ((param - 1.0) * triangle_height)),
    }
}

/// Destination of one glyph this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Index into the engine's glyph list.
    pub glyph: usize,
    pub pass: Pass,
    pub start: f32,
    pub end: f32,
    pub start_a: Point2D,
    pub start_b: Point2D,
    pub end_a: Point2D,
    pub end_b: Point2D,
}

impl GlyphQuad {
    pub fn corners(&self) -> [Point2D; 4] {
        [self.start_a, self.start_b, self.end_a, self.end_b]
    }
}

pub struct TextEngine {
    glyphs: Vec<Glyph>,
    state: ScrollState,
}

impl TextEngine {
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        Self {
            glyphs,
            state: ScrollState::default(),
        }
    }

    /// Replaces the display glyphs and restarts scrolling.
    pub fn set_glyphs(&mut self, glyphs: Vec<Glyph>) {
        self.glyphs = glyphs;
        self.state = ScrollState::default();
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Advances the active passes by `elapsed` seconds and returns every
    /// visible glyph's quad, back to front.
    pub fn tick(&mut self, elapsed: f32, path: &ScrollPath) -> Vec<GlyphQuad> {
        if self.glyphs.is_empty() {
            return Vec::new();
        }

        // Leading runs again last so a hand-back from trailing also starts
        // this frame; no pass advances twice.
        let mut quads = Vec::new();
        let mut advanced = Vec::with_capacity(2);
        for pass in [Pass::Leading, Pass::Trailing, Pass::Leading] {
            if self.state.is_active(pass) && !advanced.contains(&pass) {
                quads.extend(self.advance(pass, elapsed, path));
                advanced.push(pass);
            }
        }
        quads
    }

    fn advance(&mut self, pass: Pass, elapsed: f32, path: &ScrollPath) -> Vec<GlyphQuad> {
        let timer = {
            let t = self.state.timer_mut(pass);
            *t += elapsed.max(0.0);
            *t
        };

        let count = self.glyphs.len();
        let cursor = timer / TRAVERSAL_SECONDS;
        let visible = ((timer.floor() as usize).saturating_add(1)).min(count);
        let all_visible = visible == count;

        let mut quads = Vec::with_capacity(visible);
        let mut hand_off = false;
        let mut retire = false;

        // Trailing glyphs first so the lead glyph draws on top.
        for k in (0..visible).rev() {
            let start = cursor - k as f32 * GLYPH_SPACING;
            let end = start + GLYPH_SPACING * GLYPH_WIDTH_FRACTION;

            if all_visible && start > 1.0 {
                if k == 0 {
                    hand_off = true;
                }
                if k == visible - 1 {
                    retire = true;
                }
            }

            let h = path.triangle_height;
            let corners = (
                locate(path.line_a, start, h),
                locate(path.line_b, start, h),
                locate(path.line_a, end, h),
                locate(path.line_b, end, h),
            );
            if let (Some(start_a), Some(start_b), Some(end_a), Some(end_b)) = corners {
                quads.push(GlyphQuad {
                    glyph: count - 1 - k,
                    pass,
                    start,
                    end,
                    start_a,
                    start_b,
                    end_a,
                    end_b,
                });
            }
        }

        if hand_off && !self.state.is_active(pass.other()) {
            debug!(?pass, timer, "handing off to other pass");
            self.state.set_active(pass.other(), true);
        }
        if retire {
            debug!(?pass, timer, "pass finished");
            *self.state.timer_mut(pass) = 0.0;
            self.state.set_active(pass, false);
        }

        quads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn glyphs(text: &str) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(index, ch)| Glyph {
                index,
                ch,
                image: GrayImage::new(8, 10),
            })
            .collect()
    }

    fn lines() -> (GuideLine, GuideLine) {
        // Straight-down cone: apex (0,0), height 100, extensions 1000 long.
        let a = GuideLine::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(40.0, 100.0),
            Point2D::new(40.0 + 400.0, 100.0 + 1000.0),
        ]);
        let b = GuideLine::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(-40.0, 100.0),
            Point2D::new(-40.0 - 400.0, 100.0 + 1000.0),
        ]);
        (a, b)
    }

    #[test]
    fn starts_with_leading_pass_only() {
        let s = ScrollState::default();
        assert!(s.leading_active);
        assert!(!s.trailing_active);
        assert_eq!(s.leading, 0.0);
        assert_eq!(s.trailing, 0.0);
    }

    #[test]
    fn first_glyph_leaves_apex() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("HELLO"));

        let quads = engine.tick(0.5, &path);
        assert_eq!(quads.len(), 1);
        let q = quads[0];
        // lead glyph is the last character
        assert_eq!(q.glyph, 4);
        assert!((q.start - 0.1).abs() < EPS);
        assert!((q.end - (0.1 + 0.2 * 5.0 / 6.0)).abs() < EPS);
        assert!((q.start_a.x - 4.0).abs() < EPS);
        assert!((q.start_a.y - 10.0).abs() < EPS);
        assert!((q.start_b.x + 4.0).abs() < EPS);
    }

    #[test]
    fn one_more_glyph_per_second() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("HELLO"));

        assert_eq!(engine.tick(1.5, &path).len(), 2);
        let quads = engine.tick(1.0, &path);
        assert_eq!(quads.len(), 3);
        // back to front: trailing-most glyph first
        let order: Vec<usize> = quads.iter().map(|q| q.glyph).collect();
        assert_eq!(order, vec![2, 3, 4]);
    }

    #[test]
    fn remap_keeps_spacing_across_bend() {
        assert!((remap_param(1.5, 300.0, 600.0) - 1.25).abs() < EPS);
        assert_eq!(remap_param(0.7, 300.0, 600.0), 0.7);

        let (a, _) = lines();
        let short = GuideLine::new(a.vertices()[..2].to_vec());
        let with_ext = locate(&a, 1.3, 100.0).unwrap();
        let without = locate(&short, 1.3, 100.0).unwrap();
        assert!(with_ext.distance(without) < EPS);
        // 30 px past the edge vertex
        assert!((with_ext.distance(Point2D::new(40.0, 100.0)) - 30.0).abs() < EPS);
    }

    #[test]
    fn degenerate_path_draws_nothing() {
        let empty = GuideLine::new(vec![Point2D::new(0.0, 0.0)]);
        let path = ScrollPath { line_a: &empty, line_b: &empty, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("AB"));
        // apex-only lines still resolve params <= 1
        assert_eq!(engine.tick(0.1, &path).len(), 1);
        // past the apex there is no edge vertex to extend from
        let quads = engine.tick(6.0, &path);
        assert!(quads.iter().all(|q| q.end <= 1.0));
    }

    #[test]
    fn no_glyphs_no_quads() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(Vec::new());
        assert!(engine.tick(1.0, &path).is_empty());
        assert_eq!(*engine.state(), ScrollState::default());
    }

    #[test]
    fn reconfiguring_resets_timers() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("HI"));
        engine.tick(3.0, &path);
        assert!(engine.state().leading > 0.0);
        engine.set_glyphs(glyphs("BYE"));
        assert_eq!(*engine.state(), ScrollState::default());
        assert_eq!(engine.glyphs().len(), 3);
    }

    // The exact frame on which passes swap is a design choice; these checks
    // pin the intended windows rather than a single frame.
    #[test]
    fn passes_hand_off_and_retire() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("HELLO"));
        let dt = 0.1;

        let mut trailing_started_at = None;
        let mut leading_retired_at = None;
        let mut elapsed = 0.0f32;
        for _ in 0..200 {
            engine.tick(dt, &path);
            elapsed += dt;
            let s = *engine.state();
            if trailing_started_at.is_none() && s.trailing_active {
                trailing_started_at = Some(elapsed);
            }
            if leading_retired_at.is_none() && !s.leading_active {
                leading_retired_at = Some(elapsed);
                assert_eq!(s.leading, 0.0);
            }
            assert!(s.leading_active || s.trailing_active, "stream stopped at {}", elapsed);
        }

        // lead glyph crosses the edge vertex after one traversal
        let started = trailing_started_at.unwrap();
        assert!(started > 4.9 && started < 5.3, "trailing started at {}", started);

        // last glyph crosses it four spacings later
        let retired = leading_retired_at.unwrap();
        assert!(retired > 8.9 && retired < 9.3, "leading retired at {}", retired);
    }

    #[test]
    fn stream_alternates_over_time() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("HELLO"));

        let mut leading_restarts = 0;
        let mut was_active = true;
        for _ in 0..(60 * 40) {
            engine.tick(1.0 / 60.0, &path);
            let now = engine.state().leading_active;
            if now && !was_active {
                leading_restarts += 1;
            }
            was_active = now;
            assert!(engine.state().leading_active || engine.state().trailing_active);
        }
        assert!(leading_restarts >= 2, "leading restarted {} times", leading_restarts);
    }

    #[test]
    fn leading_restarts_in_the_frame_it_is_handed_back() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("HELLO"));

        let mut was_active = true;
        for _ in 0..200 {
            let quads = engine.tick(0.1, &path);
            let s = *engine.state();
            if s.leading_active && !was_active {
                assert!(s.leading > 0.0, "leading timer did not move on restart");
                assert!(quads.iter().any(|q| q.pass == Pass::Leading));
                return;
            }
            was_active = s.leading_active;
        }
        panic!("leading pass never restarted");
    }

    #[test]
    fn single_glyph_hands_off_and_retires_together() {
        let (a, b) = lines();
        let path = ScrollPath { line_a: &a, line_b: &b, triangle_height: 100.0 };
        let mut engine = TextEngine::new(glyphs("X"));
        for _ in 0..55 {
            engine.tick(0.1, &path);
        }
        let s = engine.state();
        assert!(!s.leading_active);
        assert!(s.trailing_active);
        assert!(s.trailing > 0.0 && s.trailing < 1.0, "trailing timer {}", s.trailing);
    }
}
