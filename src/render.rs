//! Per-frame tick: solve, composite, scroll, draw.

use image::RgbImage;
use tracing::{debug, warn};

use crate::callout::{solve_frame_callout, Callout};
use crate::compositor::{composite_in_place, DuotoneGradient, FrameMask};
use crate::frame::{solve_face_frame, FaceFrame};
use crate::overlay::{draw_overlay, draw_status, OverlayPrimitives, OverlayStyle, StatusLines};
use crate::text::{Glyph, ScrollPath, TextEngine};
use crate::tracker::TrackerFrame;
use crate::types::Direction;

/// Geometry from the most recent tracker update.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub face: Option<FaceFrame>,
    pub callout: Option<Callout>,
    pub status: StatusLines,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            face: None,
            callout: None,
            status: StatusLines::new(false, None, Direction::None),
        }
    }
}

impl RenderState {
    /// Runs the frame and callout solvers on a tracker update.
    pub fn solve(tracked: &TrackerFrame, expression: Option<&str>, frame_height: f32) -> Self {
        let status = StatusLines::new(tracked.found, expression, tracked.direction);
        if !tracked.found {
            return Self {
                status,
                ..Default::default()
            };
        }

        let face = match solve_face_frame(&tracked.landmarks) {
            Ok(f) => f,
            Err(e) if e.is_recoverable() => {
                debug!("no overlay this frame: {}", e);
                return Self {
                    status,
                    ..Default::default()
                };
            }
            Err(e) => {
                warn!("face solve failed: {}", e);
                return Self {
                    status,
                    ..Default::default()
                };
            }
        };
        let callout = solve_frame_callout(&face, frame_height);

        Self {
            face: Some(face),
            callout,
            status,
        }
    }
}

pub struct RenderedFrame {
    pub image: RgbImage,
    pub primitives: OverlayPrimitives,
    pub status: StatusLines,
}

pub struct OverlayRenderer {
    gradient: DuotoneGradient,
    engine: TextEngine,
    style: OverlayStyle,
    state: RenderState,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle, glyphs: Vec<Glyph>) -> Self {
        Self {
            gradient: DuotoneGradient::new(style.cone_color),
            engine: TextEngine::new(glyphs),
            style,
            state: RenderState::default(),
        }
    }

    pub fn set_glyphs(&mut self, glyphs: Vec<Glyph>) {
        self.engine.set_glyphs(glyphs);
    }

    pub fn engine(&self) -> &TextEngine {
        &self.engine
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut OverlayStyle {
        &mut self.style
    }

    /// `tracked` is `None` when the tracker had nothing new; the last
    /// committed geometry is drawn again.
    pub fn tick(
        &mut self,
        frame: &RgbImage,
        tracked: Option<&TrackerFrame>,
        expression: Option<&str>,
        elapsed: f32,
    ) -> RenderedFrame {
        let (width, height) = (frame.width() as f32, frame.height() as f32);

        if let Some(t) = tracked {
            self.state = RenderState::solve(t, expression, height);
        }

        let mask = self
            .state
            .face
            .as_ref()
            .map(|f| FrameMask::new(f.circle, width, height));

        let mut image = frame.clone();
        composite_in_place(&mut image, mask.as_ref(), &self.gradient);

        let mut primitives = OverlayPrimitives {
            circle: self.state.face.as_ref().map(|f| f.circle),
            frames: mask,
            ..Default::default()
        };

        if let Some(callout) = &self.state.callout {
            primitives.cone = callout.cone_triangle();
            primitives.guide_segments = callout
                .label_a
                .segments()
                .chain(callout.label_b.segments())
                .collect();
            primitives.glyph_quads = self.engine.tick(elapsed, &ScrollPath::from_callout(callout));
        }

        draw_overlay(&mut image, &primitives, self.engine.glyphs(), &self.style);
        if self.style.show_status {
            draw_status(&mut image, &self.state.status, self.style.status_scale);
        }

        RenderedFrame {
            image,
            primitives,
            status: self.state.status.clone(),
        }
    }
}
