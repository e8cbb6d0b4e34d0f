use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point in camera-pixel space (x right, y down)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Point2D) -> f32 {
        (*self - other).length()
    }

    pub fn dot(&self, other: Point2D) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, `None` for the zero vector.
    pub fn normalized(&self) -> Option<Point2D> {
        let len = self.length();
        if len <= f32::EPSILON {
            None
        } else {
            Some(Point2D::new(self.x / len, self.y / len))
        }
    }

    /// Mean of `points`, `None` when empty.
    pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f32;
        let sum = points.iter().fold(Point2D::default(), |acc, p| acc + *p);
        Some(Point2D::new(sum.x / n, sum.y / n))
    }

    pub fn lerp(self, to: Point2D, amt: f32) -> Point2D {
        self + (to - self) * amt
    }
}

impl std::ops::Add for Point2D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Point2D {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Axis-aligned bounds of a point set, `None` when empty.
    pub fn bounding(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Moves (x, y) to the minimum corner so width and height are non-negative.
    pub fn standardize(self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Named landmark groups the tracker reports each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkFeature {
    FaceOutline,
    NoseBridge,
    InnerMouth,
}

impl std::fmt::Display for LandmarkFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LandmarkFeature::FaceOutline => "face outline",
            LandmarkFeature::NoseBridge => "nose bridge",
            LandmarkFeature::InnerMouth => "inner mouth",
        };
        f.write_str(name)
    }
}

/// Ordered points of one landmark group. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub points: Vec<Point2D>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }
}

/// All landmark groups of one tracked frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    #[serde(default)]
    pub sets: HashMap<LandmarkFeature, LandmarkSet>,
}

impl Landmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: LandmarkFeature, points: Vec<Point2D>) -> Self {
        self.sets.insert(feature, LandmarkSet::new(points));
        self
    }

    /// Points of `feature`; an absent group reads as empty.
    pub fn get(&self, feature: LandmarkFeature) -> &[Point2D] {
        self.sets
            .get(&feature)
            .map(|s| s.points.as_slice())
            .unwrap_or(&[])
    }

}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    FacingLeft,
    FacingRight,
    FacingForward,
    #[default]
    None,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::FacingLeft => "left",
            Direction::FacingRight => "right",
            Direction::FacingForward => "forward",
            Direction::None => "none",
        }
    }
}

/// Circle framing the head. `radius > 0` whenever a face was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingCircle {
    pub center: Point2D,
    pub radius: f32,
}

impl BoundingCircle {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        dx * dx + dy * dy < self.radius * self.radius
    }
}

/// Face tilt line expressed as x = slope * y + intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltAxis {
    pub slope: f32,
    pub intercept: f32,
}

impl TiltAxis {
    pub fn x_at(&self, y: f32) -> f32 {
        self.slope * y + self.intercept
    }

    pub fn point_at(&self, y: f32) -> Point2D {
        Point2D::new(self.x_at(y), y)
    }
}
