//! Callout cone: two guide lines fanning out from the mouth along the tilt axis.

use tracing::debug;

use crate::constants::{FRAME_PADDING, HALF_VERTEX_DEGREES, OFFSET_APEX_RISE};
use crate::error::{OverlayError, Result};
use crate::frame::FaceFrame;
use crate::geometry::{angle_from_up, line_circle_exit_point, unit_from_up};
use crate::types::{BoundingCircle, Point2D, TiltAxis};

/// Polyline `[apex, edge_vertex, extended_vertex?]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    vertices: Vec<Point2D>,
}

impl GuideLine {
    pub fn new(vertices: Vec<Point2D>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    pub fn apex(&self) -> Option<Point2D> {
        self.vertices.first().copied()
    }

    pub fn edge_vertex(&self) -> Option<Point2D> {
        self.vertices.get(1).copied()
    }

    pub fn extended_vertex(&self) -> Option<Point2D> {
        self.vertices.get(2).copied()
    }

    /// Consecutive vertex pairs, for stroking.
    pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.vertices.windows(2).map(|w| (w[0], w[1]))
    }

    /// Index-interpolated point: `param` 0 is the apex, 1 the edge vertex,
    /// 2 the extended vertex. Values past the last vertex continue the last
    /// segment; negative values clamp to the apex.
    pub fn point_at(&self, param: f32) -> Option<Point2D> {
        match self.vertices.len() {
            0 => None,
            1 => Some(self.vertices[0]),
            n => {
                if param <= 0.0 {
                    return Some(self.vertices[0]);
                }
                let i = (param.floor() as usize).min(n - 2);
                let t = param - i as f32;
                Some(self.vertices[i].lerp(self.vertices[i + 1], t))
            }
        }
    }

    /// Unit direction of the apex to edge-vertex segment.
    pub fn direction(&self) -> Option<Point2D> {
        (self.edge_vertex()? - self.apex()?).normalized()
    }
}

/// Symmetric cone for one apex.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cone {
    angle: f32,
    triangle_height: f32,
    slant_length: f32,
    vertex_a: Point2D,
    vertex_b: Point2D,
}

fn solve_cone(apex: Point2D, far_endpoint: Point2D) -> Result<Cone> {
    let axis = far_endpoint - apex;
    if axis.normalized().is_none() {
        return Err(OverlayError::ZeroLengthDirection);
    }

    let triangle_height = axis.length();
    let slant_length = triangle_height / HALF_VERTEX_DEGREES.to_radians().cos();
    let angle = angle_from_up(axis);

    Ok(Cone {
        angle,
        triangle_height,
        slant_length,
        vertex_a: apex + unit_from_up(angle + HALF_VERTEX_DEGREES) * slant_length,
        vertex_b: apex + unit_from_up(angle - HALF_VERTEX_DEGREES) * slant_length,
    })
}

/// Primary guide line, extended past the edge vertex when the edge stops
/// short of the padded frame bottom.
fn guide_line(apex: Point2D, vertex: Point2D, bottom: f32) -> GuideLine {
    let mut vertices = vec![apex, vertex];
    if vertex.y < bottom {
        if let Some(dir) = (vertex - apex).normalized() {
            vertices.push(vertex + dir * (2.0 * bottom));
        }
    }
    GuideLine::new(vertices)
}

/// Label line from the offset apex, started where it leaves the head circle.
fn label_line(offset_apex: Point2D, vertex: Point2D, circle: &BoundingCircle) -> GuideLine {
    let start = match line_circle_exit_point(offset_apex, vertex, circle.center, circle.radius) {
        Ok(p) => p,
        Err(e) => {
            debug!("label line falls back to offset apex: {}", e);
            offset_apex
        }
    };
    GuideLine::new(vec![start, vertex])
}

#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub apex: Point2D,
    pub far_endpoint: Point2D,
    /// Angle of the tilt axis from "up", degrees.
    pub angle: f32,
    pub triangle_height: f32,
    pub slant_length: f32,
    pub line_a: GuideLine,
    pub line_b: GuideLine,
    pub offset_apex: Point2D,
    pub label_a: GuideLine,
    pub label_b: GuideLine,
}

impl Callout {
    /// Filled cone triangle: apex plus both edge vertices.
    pub fn cone_triangle(&self) -> Option<[Point2D; 3]> {
        Some([
            self.apex,
            self.line_a.edge_vertex()?,
            self.line_b.edge_vertex()?,
        ])
    }
}

/// Callout Solver entry point.
pub fn solve_callout(
    circle: &BoundingCircle,
    tilt: &TiltAxis,
    mouth: Point2D,
    frame_height: f32,
) -> Result<Callout> {
    let bottom = frame_height + FRAME_PADDING;
    let far_endpoint = tilt.point_at(bottom);

    let cone = solve_cone(mouth, far_endpoint)?;

    let offset_apex = tilt.point_at(mouth.y - OFFSET_APEX_RISE);
    let offset = solve_cone(offset_apex, far_endpoint)?;

    Ok(Callout {
        apex: mouth,
        far_endpoint,
        angle: cone.angle,
        triangle_height: cone.triangle_height,
        slant_length: cone.slant_length,
        line_a: guide_line(mouth, cone.vertex_a, bottom),
        line_b: guide_line(mouth, cone.vertex_b, bottom),
        offset_apex,
        label_a: label_line(offset_apex, offset.vertex_a, circle),
        label_b: label_line(offset_apex, offset.vertex_b, circle),
    })
}

/// Callout for a solved frame, `None` when the mouth or tilt is missing.
pub fn solve_frame_callout(frame: &FaceFrame, frame_height: f32) -> Option<Callout> {
    let (mouth, tilt) = frame.mouth_and_tilt()?;
    match solve_callout(&frame.circle, &tilt, mouth, frame_height) {
        Ok(c) => Some(c),
        Err(e) => {
            debug!("skipping callout: {}", e);
            None
        }
    }
}
