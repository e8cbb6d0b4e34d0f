//! Face-locked duotone overlay: a head circle and side frames kept in
//! grayscale over a brand-coloured frame, with a callout cone leaving the
//! mouth and a glyph ticker scrolling out along it.

pub mod callout;
pub mod compositor;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod glyphs;
pub mod overlay;
pub mod render;
pub mod text;
pub mod tracker;
pub mod types;
pub mod warp;

pub use callout::{solve_callout, Callout, GuideLine};
pub use compositor::{composite, DuotoneGradient, FrameMask};
pub use error::{OverlayError, Result};
pub use frame::{solve_face_frame, FaceFrame};
pub use render::{OverlayRenderer, RenderedFrame};
pub use text::{Glyph, GlyphQuad, ScrollState, TextEngine};
pub use tracker::{FaceTracker, TrackerFrame};
pub use types::{BoundingCircle, Direction, LandmarkFeature, Landmarks, Point2D, TiltAxis};
