//! Tracker and expression-classifier seams, with offline implementations.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::error::{OverlayError, Result};
use crate::types::{Direction, LandmarkFeature, Landmarks, Point2D};

/// Label the overlay treats as "mouth open".
pub const OPEN_MOUTH: &str = "open mouth";
pub const NEUTRAL: &str = "neutral";

/// What the tracker reports for one camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerFrame {
    pub found: bool,
    #[serde(default)]
    pub landmarks: Landmarks,
    #[serde(default)]
    pub direction: Direction,
}

impl TrackerFrame {
    pub fn lost() -> Self {
        Self::default()
    }
}

pub trait FaceTracker {
    fn name(&self) -> String;

    /// `Ok(None)` means no new data this frame.
    fn track(&mut self, frame: &RgbImage) -> Result<Option<TrackerFrame>>;
}

pub trait ExpressionClassifier {
    /// Primary expression label, `None` when nothing was classified.
    fn classify(&mut self, frame: &TrackerFrame) -> Option<String>;
}

/// Synthetic face that sways, rolls and opens its mouth, centred in the frame.
pub struct SimulatedTracker {
    frame_count: u32,
}

impl SimulatedTracker {
    pub fn new() -> Self {
        Self { frame_count: 0 }
    }

    /// Landmarks for a face at `center` with `size` (outline width), rolled
    /// by `roll_deg` and mouth opened by `mouth_open` pixels.
    pub fn face(center: Point2D, size: f32, roll_deg: f32, mouth_open: f32) -> Landmarks {
        let (sin, cos) = roll_deg.to_radians().sin_cos();
        let rotate = |p: Point2D| {
            let d = p - center;
            center + Point2D::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
        };

        let half_w = size / 2.0;
        let half_h = size * 0.55;

        // Jaw from temple to temple plus the brow line.
        let mut outline: Vec<Point2D> = (0..=16)
            .map(|i| {
                let a = std::f32::consts::PI * i as f32 / 16.0;
                Point2D::new(center.x - half_w * a.cos(), center.y + half_h * a.sin() - half_h * 0.1)
            })
            .collect();
        outline.extend((0..=8).map(|i| {
            let f = i as f32 / 8.0;
            Point2D::new(center.x - half_w * 0.8 + f * size * 0.8, center.y - half_h * 0.45)
        }));

        let nose: Vec<Point2D> = (0..4)
            .map(|i| Point2D::new(center.x, center.y - half_h * 0.35 + i as f32 * half_h * 0.15))
            .collect();

        let mouth_center = Point2D::new(center.x, center.y + half_h * 0.45);
        let mouth_w = size * 0.18;
        let mouth: Vec<Point2D> = (0..8)
            .map(|i| {
                let a = std::f32::consts::TAU * i as f32 / 8.0;
                mouth_center + Point2D::new(mouth_w * a.cos(), (mouth_open / 2.0) * a.sin())
            })
            .collect();

        Landmarks::new()
            .with(LandmarkFeature::FaceOutline, outline.into_iter().map(rotate).collect())
            .with(LandmarkFeature::NoseBridge, nose.into_iter().map(rotate).collect())
            .with(LandmarkFeature::InnerMouth, mouth.into_iter().map(rotate).collect())
    }
}

impl Default for SimulatedTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceTracker for SimulatedTracker {
    fn name(&self) -> String {
        "Simulated Face".to_string()
    }

    fn track(&mut self, frame: &RgbImage) -> Result<Option<TrackerFrame>> {
        self.frame_count += 1;

        let t = self.frame_count as f32 * 0.05;
        let (w, h) = (frame.width() as f32, frame.height() as f32);

        let sway = t.cos() * w * 0.08;
        let center = Point2D::new(w / 2.0 + sway, h * 0.4);
        let size = h * 0.35;
        let roll = (t * 0.6).sin() * 15.0;
        let mouth_open = ((t * 0.7).sin().max(0.0)) * size * 0.2;

        let direction = if sway > w * 0.04 {
            Direction::FacingRight
        } else if sway < -w * 0.04 {
            Direction::FacingLeft
        } else {
            Direction::FacingForward
        };

        Ok(Some(TrackerFrame {
            found: true,
            landmarks: Self::face(center, size, roll, mouth_open),
            direction,
        }))
    }
}

/// Plays back recorded tracker frames (one JSON object per line), looping.
pub struct ReplayTracker {
    frames: Vec<TrackerFrame>,
    cursor: usize,
}

impl ReplayTracker {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let tracker = Self::from_reader(file)?;
        info!(
            "Loaded {} recorded frames from {}",
            tracker.frames.len(),
            path.as_ref().display()
        );
        Ok(tracker)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            frames.push(serde_json::from_str::<TrackerFrame>(&line)?);
        }
        if frames.is_empty() {
            return Err(OverlayError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "recording has no frames",
            )));
        }
        Ok(Self { frames, cursor: 0 })
    }
}

impl FaceTracker for ReplayTracker {
    fn name(&self) -> String {
        format!("Replay ({} frames)", self.frames.len())
    }

    fn track(&mut self, _frame: &RgbImage) -> Result<Option<TrackerFrame>> {
        let frame = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(Some(frame))
    }
}

/// Calls the mouth open when the inner mouth is tall relative to the face.
pub struct MouthOpennessClassifier {
    threshold: f32,
}

impl MouthOpennessClassifier {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for MouthOpennessClassifier {
    fn default() -> Self {
        Self::new(0.06)
    }
}

impl ExpressionClassifier for MouthOpennessClassifier {
    fn classify(&mut self, frame: &TrackerFrame) -> Option<String> {
        if !frame.found {
            return None;
        }
        let outline = crate::types::Rect::bounding(frame.landmarks.get(LandmarkFeature::FaceOutline))?;
        let mouth = crate::types::Rect::bounding(frame.landmarks.get(LandmarkFeature::InnerMouth))?;
        if outline.width <= 0.0 {
            return None;
        }
        // Roll-tolerant: use the shorter side of the mouth box.
        let opening = mouth.width.min(mouth.height);
        let label = if opening / outline.width > self.threshold {
            OPEN_MOUTH
        } else {
            NEUTRAL
        };
        Some(label.to_string())
    }
}
