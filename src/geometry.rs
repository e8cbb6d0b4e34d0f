//! Stateless 2D helpers shared by the solvers and the compositor.

use crate::error::{OverlayError, Result};
use crate::types::Point2D;

/// z-component of (b - a) x (s - a).
fn cross(a: Point2D, b: Point2D, s: Point2D) -> f32 {
    (b.x - a.x) * (s.y - a.y) - (b.y - a.y) * (s.x - a.x)
}

/// Same-side test against edges `ab` and `bc`.
///
/// Works for either winding. Collinear triangles give a deterministic
/// answer but no meaningful containment.
pub fn point_in_triangle(s: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    let s_ab = cross(a, b, s) > 0.0;

    if (cross(a, c, s) > 0.0) == s_ab {
        return false;
    }

    if (cross(b, c, s) > 0.0) != s_ab {
        return false;
    }

    true
}

/// Point where the ray from `a` through `b` leaves the circle.
///
/// Returns the far root. A tangent ray yields the touching point; a ray
/// that passes outside the circle yields [`OverlayError::NoIntersection`].
pub fn line_circle_exit_point(
    a: Point2D,
    b: Point2D,
    center: Point2D,
    radius: f32,
) -> Result<Point2D> {
    let d = (b - a).normalized().ok_or(OverlayError::ZeroLengthDirection)?;

    let t = d.dot(center - a);
    let e = a + d * t;
    let dist = center.distance(e);

    if dist > radius {
        return Err(OverlayError::NoIntersection);
    }

    let dt = (radius * radius - dist * dist).max(0.0).sqrt();
    Ok(a + d * (t + dt))
}

/// Signed angle in degrees from "up" (0, -1) to `v`, in (-180, 180].
pub fn angle_from_up(v: Point2D) -> f32 {
    (-v.x).atan2(-v.y).to_degrees()
}

/// Unit vector whose [`angle_from_up`] is `degrees`.
pub fn unit_from_up(degrees: f32) -> Point2D {
    let r = degrees.to_radians();
    Point2D::new(-r.sin(), -r.cos())
}

/// Wraps an angle into (-180, 180].
pub fn normalize_degrees(degrees: f32) -> f32 {
    let mut d = degrees % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}
