//! Per-frame face framing: head circle, tilt axis and mouth position.
//!
//! Every function here is a pure transform of the current frame's
//! landmarks. Nothing is carried over between frames, so any jitter in the
//! tracker shows up one-to-one in the circle.

use tracing::debug;

use crate::constants::{CIRCLE_SCALE, HAIRLINE_EXPANSION, MAX_TILT_SLOPE, MIN_TILT_SPAN};
use crate::error::{OverlayError, Result};
use crate::types::{BoundingCircle, LandmarkFeature, Landmarks, Point2D, Rect, TiltAxis};

/// Head rectangle grown upward to include the hairline.
pub fn expanded_face_rect(outline: &[Point2D]) -> Result<Rect> {
    let bounds = Rect::bounding(outline)
        .ok_or(OverlayError::NoFaceDetected)?
        .standardize();

    let extra = bounds.height * HAIRLINE_EXPANSION;
    Ok(Rect::new(
        bounds.x,
        bounds.y - extra,
        bounds.width,
        bounds.height + extra,
    ))
}

/// Circle around the expanded head rectangle.
pub fn bounding_circle(outline: &[Point2D]) -> Result<BoundingCircle> {
    let expanded = expanded_face_rect(outline)?;

    let max_dimension = expanded.height.max(expanded.width);
    let diameter = max_dimension * CIRCLE_SCALE;
    let radius = diameter / 2.0;

    if radius <= 0.0 {
        // A single point (or all points coincident) has no extent.
        return Err(OverlayError::DegenerateLandmarks {
            feature: LandmarkFeature::FaceOutline,
            required: 2,
            found: outline.len(),
        });
    }

    Ok(BoundingCircle {
        center: expanded.center(),
        radius,
    })
}

/// Slope of the nose bridge as dx/dy, from its first two points.
///
/// Slopes steeper than [`MAX_TILT_SLOPE`] are clamped so the projected
/// endpoint stays finite.
pub fn tilt_slope(nose_bridge: &[Point2D]) -> Result<f32> {
    let (start, end) = match nose_bridge {
        [start, end, ..] => (*start, *end),
        _ => {
            return Err(OverlayError::DegenerateLandmarks {
                feature: LandmarkFeature::NoseBridge,
                required: 2,
                found: nose_bridge.len(),
            })
        }
    };

    let dy = end.y - start.y;
    if dy.abs() < MIN_TILT_SPAN {
        return Err(OverlayError::DivideByTiltDegeneracy);
    }

    let slope = (end.x - start.x) / dy;
    if slope.abs() > MAX_TILT_SLOPE {
        debug!(slope, "clamping steep tilt slope");
    }
    Ok(slope.clamp(-MAX_TILT_SLOPE, MAX_TILT_SLOPE))
}

/// Tilt axis with the nose bridge's slope, passing through `anchor`.
pub fn tilt_axis(nose_bridge: &[Point2D], anchor: Point2D) -> Result<TiltAxis> {
    let slope = tilt_slope(nose_bridge)?;
    Ok(TiltAxis {
        slope,
        intercept: anchor.x - slope * anchor.y,
    })
}

pub fn mouth_centroid(inner_mouth: &[Point2D]) -> Result<Point2D> {
    Point2D::centroid(inner_mouth).ok_or(OverlayError::DegenerateLandmarks {
        feature: LandmarkFeature::InnerMouth,
        required: 1,
        found: 0,
    })
}

/// Geometry derived from one frame's landmarks.
///
/// `circle` is always present; the mouth-dependent parts are absent when
/// their landmark groups are too small.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceFrame {
    pub circle: BoundingCircle,
    pub mouth: Option<Point2D>,
    pub tilt: Option<TiltAxis>,
}

impl FaceFrame {
    /// Mouth centroid and tilt axis, when both were derived.
    pub fn mouth_and_tilt(&self) -> Option<(Point2D, TiltAxis)> {
        Some((self.mouth?, self.tilt?))
    }
}

/// Frame Solver entry point. Fails only when the outline is empty.
pub fn solve_face_frame(landmarks: &Landmarks) -> Result<FaceFrame> {
    let circle = bounding_circle(landmarks.get(LandmarkFeature::FaceOutline))?;

    let mouth = match mouth_centroid(landmarks.get(LandmarkFeature::InnerMouth)) {
        Ok(m) => Some(m),
        Err(e) => {
            debug!("skipping mouth: {}", e);
            None
        }
    };

    let tilt = mouth.and_then(|anchor| {
        match tilt_axis(landmarks.get(LandmarkFeature::NoseBridge), anchor) {
            Ok(axis) => Some(axis),
            Err(e) => {
                debug!("skipping tilt axis: {}", e);
                None
            }
        }
    });

    Ok(FaceFrame { circle, mouth, tilt })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn outline_for(x: f32, y: f32, w: f32, h: f32) -> Vec<Point2D> {
        vec![
            Point2D::new(x, y + h * 0.3),
            Point2D::new(x + w * 0.5, y),
            Point2D::new(x + w, y + h * 0.4),
            Point2D::new(x + w * 0.6, y + h),
            Point2D::new(x + w * 0.2, y + h * 0.9),
        ]
    }

    #[test]
    fn outline_scenario_matches_reference_numbers() {
        let outline = outline_for(100.0, 50.0, 200.0, 150.0);
        let rect = expanded_face_rect(&outline).unwrap();
        assert!((rect.height - 225.0).abs() < EPS);
        assert!((rect.y + 25.0).abs() < EPS);

        let circle = bounding_circle(&outline).unwrap();
        assert!((circle.radius - 168.75).abs() < EPS);
        assert!((circle.center.x - 200.0).abs() < EPS);
        assert!((circle.center.y - 87.5).abs() < EPS);
    }

    #[test]
    fn radius_is_three_quarters_of_larger_side() {
        for (w, h) in [(200.0f32, 150.0f32), (400.0, 100.0), (90.0, 300.0), (60.0, 40.0)] {
            let circle = bounding_circle(&outline_for(10.0, 20.0, w, h)).unwrap();
            let expected = 0.75 * (1.5 * h).max(w);
            assert!(
                (circle.radius - expected).abs() < 1e-3,
                "w={} h={} radius={} expected={}",
                w,
                h,
                circle.radius,
                expected
            );
        }
    }

    #[test]
    fn empty_outline_means_no_face() {
        assert!(matches!(bounding_circle(&[]), Err(OverlayError::NoFaceDetected)));
        assert!(matches!(
            solve_face_frame(&Landmarks::new()),
            Err(OverlayError::NoFaceDetected)
        ));
    }

    #[test]
    fn nose_bridge_needs_two_points() {
        let res = tilt_slope(&[Point2D::new(1.0, 1.0)]);
        assert!(matches!(
            res,
            Err(OverlayError::DegenerateLandmarks { required: 2, found: 1, .. })
        ));
    }

    #[test]
    fn horizontal_nose_bridge_is_guarded() {
        let res = tilt_slope(&[Point2D::new(0.0, 10.0), Point2D::new(5.0, 10.0)]);
        assert!(matches!(res, Err(OverlayError::DivideByTiltDegeneracy)));
    }

    #[test]
    fn steep_tilt_is_clamped() {
        let slope = tilt_slope(&[Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.5)]).unwrap();
        assert_eq!(slope, MAX_TILT_SLOPE);
    }

    #[test]
    fn tilt_axis_passes_through_mouth() {
        let nose = [Point2D::new(100.0, 100.0), Point2D::new(110.0, 140.0)];
        let mouth = Point2D::new(130.0, 200.0);
        let axis = tilt_axis(&nose, mouth).unwrap();
        assert!((axis.slope - 0.25).abs() < EPS);
        assert!((axis.x_at(200.0) - 130.0).abs() < EPS);
    }

    #[test]
    fn missing_mouth_keeps_circle() {
        let lm = Landmarks::new()
            .with(LandmarkFeature::FaceOutline, outline_for(100.0, 50.0, 200.0, 150.0))
            .with(
                LandmarkFeature::NoseBridge,
                vec![Point2D::new(200.0, 80.0), Point2D::new(200.0, 120.0)],
            );
        let frame = solve_face_frame(&lm).unwrap();
        assert!(frame.mouth.is_none());
        assert!(frame.tilt.is_none());
        assert!(frame.mouth_and_tilt().is_none());
    }

    #[test]
    fn full_landmarks_give_full_frame() {
        let lm = Landmarks::new()
            .with(LandmarkFeature::FaceOutline, outline_for(100.0, 50.0, 200.0, 150.0))
            .with(
                LandmarkFeature::NoseBridge,
                vec![Point2D::new(200.0, 80.0), Point2D::new(200.0, 120.0)],
            )
            .with(
                LandmarkFeature::InnerMouth,
                vec![Point2D::new(190.0, 170.0), Point2D::new(210.0, 170.0), Point2D::new(200.0, 176.0)],
            );
        let frame = solve_face_frame(&lm).unwrap();
        let (mouth, tilt) = frame.mouth_and_tilt().unwrap();
        assert!((mouth.x - 200.0).abs() < EPS);
        assert!((mouth.y - 172.0).abs() < EPS);
        assert!(tilt.slope.abs() < EPS);
    }
}
