//! Pixel-space geometry shared by every stage of the reframe pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Source video frame size in pixels.
///
/// Signed so that caller-provided garbage (zero or negative sizes) survives
/// deserialization and can be rejected with a typed error instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FrameDimensions {
    pub width: i32,
    pub height: i32,
}

impl FrameDimensions {
    /// Create new frame dimensions.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Both sides must be strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Frame center in pixels.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

impl std::fmt::Display for FrameDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Frame metadata reported by media inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    pub width: i32,
    pub height: i32,
    /// Duration in seconds (0.0 when unknown)
    #[serde(default, alias = "durationSeconds", alias = "duration")]
    pub duration_seconds: f64,
}

impl VideoMetadata {
    /// Frame dimensions of the video stream.
    pub fn frame(&self) -> FrameDimensions {
        FrameDimensions::new(self.width, self.height)
    }
}

/// Axis-aligned box in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: f64,
    /// Top edge y-coordinate
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a box from its edges.
    pub fn from_edges(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Intersect with the frame. Returns `None` when nothing with positive area remains.
    pub fn clamp_to(&self, frame: &FrameDimensions) -> Option<BoundingBox> {
        if !self.x.is_finite() || !self.y.is_finite() || !self.width.is_finite() || !self.height.is_finite() {
            return None;
        }

        let x1 = self.x.max(0.0);
        let y1 = self.y.max(0.0);
        let x2 = self.x2().min(frame.width as f64);
        let y2 = self.y2().min(frame.height as f64);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(BoundingBox::from_edges(x1, y1, x2, y2))
    }

    /// Compute bounding box that contains all input boxes.
    pub fn union(boxes: &[BoundingBox]) -> Option<BoundingBox> {
        if boxes.is_empty() {
            return None;
        }

        let x = boxes.iter().map(|b| b.x).fold(f64::INFINITY, f64::min);
        let y = boxes.iter().map(|b| b.y).fold(f64::INFINITY, f64::min);
        let x2 = boxes.iter().map(|b| b.x2()).fold(f64::NEG_INFINITY, f64::max);
        let y2 = boxes.iter().map(|b| b.y2()).fold(f64::NEG_INFINITY, f64::max);

        Some(BoundingBox::from_edges(x, y, x2, y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_validity() {
        assert!(FrameDimensions::new(1920, 1080).is_valid());
        assert!(!FrameDimensions::new(0, 1080).is_valid());
        assert!(!FrameDimensions::new(1920, -1).is_valid());
    }

    #[test]
    fn test_bounding_box_union() {
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 50.0, 50.0),
            BoundingBox::new(100.0, 100.0, 50.0, 50.0),
        ];

        let union = BoundingBox::union(&boxes).unwrap();
        assert_eq!(union.x, 0.0);
        assert_eq!(union.y, 0.0);
        assert_eq!(union.width, 150.0);
        assert_eq!(union.height, 150.0);
    }

    #[test]
    fn test_clamp_to_frame() {
        let frame = FrameDimensions::new(100, 100);

        let partly_outside = BoundingBox::new(-10.0, 80.0, 30.0, 40.0);
        let clamped = partly_outside.clamp_to(&frame).unwrap();
        assert_eq!(clamped, BoundingBox::new(0.0, 80.0, 20.0, 20.0));

        let outside = BoundingBox::new(150.0, 0.0, 10.0, 10.0);
        assert!(outside.clamp_to(&frame).is_none());

        let degenerate = BoundingBox::new(10.0, 10.0, 0.0, 20.0);
        assert!(degenerate.clamp_to(&frame).is_none());
    }

    #[test]
    fn test_video_metadata_aliases() {
        let meta: VideoMetadata =
            serde_json::from_str(r#"{"width":1280,"height":720,"durationSeconds":12.5}"#).unwrap();
        assert_eq!(meta.frame(), FrameDimensions::new(1280, 720));
        assert!((meta.duration_seconds - 12.5).abs() < f64::EPSILON);
    }
}
