//! Fixed geometry and animation constants.

/// Half of the callout cone's vertex angle, in degrees.
pub const HALF_VERTEX_DEGREES: f32 = 22.5;

/// Seconds for the lead glyph to travel one triangle height.
pub const TRAVERSAL_SECONDS: f32 = 5.0;

/// Parameter offset between consecutive glyphs.
pub const GLYPH_SPACING: f32 = 0.2;

/// Share of the per-glyph spacing occupied by the glyph itself (rest is gap).
pub const GLYPH_WIDTH_FRACTION: f32 = 5.0 / 6.0;

/// Rows and columns of the glyph warp mesh.
pub const MESH_SUBDIVISIONS: usize = 40;

/// Pixels below the frame bottom the tilt axis is projected to.
pub const FRAME_PADDING: f32 = 50.0;

/// Circle diameter relative to the expanded face rectangle's larger side.
pub const CIRCLE_SCALE: f32 = 1.5;

/// Upward growth of the outline box, relative to its height, to cover the hairline.
pub const HAIRLINE_EXPANSION: f32 = 0.5;

/// How far above the mouth centroid the label callout starts.
pub const OFFSET_APEX_RISE: f32 = 5.0;

/// Entries in the duotone lookup table.
pub const GRADIENT_LEN: usize = 255;

/// Steepest tilt slope (|dx/dy|) accepted before clamping.
pub const MAX_TILT_SLOPE: f32 = 8.0;

/// Nose bridge spans shorter than this in y are treated as degenerate.
pub const MIN_TILT_SPAN: f32 = 1e-3;

pub const DEFAULT_BRAND_COLOR: [u8; 3] = [255, 70, 47];
pub const DEFAULT_GLYPH_COLOR: [u8; 3] = [49, 48, 44];
