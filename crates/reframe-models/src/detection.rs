//! Subject detections produced by the external detector.
//!
//! Detectors report boxes in one of two shapes:
//! - `{x, y, width, height}` in absolute source pixels
//! - `{left, top, width, height}` as fractions (0–1) of the frame
//!
//! The shape is decided once, by the field names present, and normalized to
//! absolute pixels with [`DetectionBox::to_absolute`].

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{BoundingBox, FrameDimensions};

/// Bounding box as reported by a detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DetectionBox {
    /// Absolute pixel box.
    Absolute {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Box relative to the frame size.
    Fractional {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
}

impl DetectionBox {
    pub fn absolute(x: f64, y: f64, width: f64, height: f64) -> Self {
        DetectionBox::Absolute { x, y, width, height }
    }

    pub fn fractional(left: f64, top: f64, width: f64, height: f64) -> Self {
        DetectionBox::Fractional {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert to absolute pixels. No clamping is applied.
    pub fn to_absolute(&self, frame: &FrameDimensions) -> BoundingBox {
        match *self {
            DetectionBox::Absolute {
                x,
                y,
                width,
                height,
            } => BoundingBox::new(x, y, width, height),
            DetectionBox::Fractional {
                left,
                top,
                width,
                height,
            } => {
                let fw = frame.width as f64;
                let fh = frame.height as f64;
                BoundingBox::new(left * fw, top * fh, width * fw, height * fh)
            }
        }
    }
}

/// A single detected subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    #[serde(rename = "boundingBox", alias = "bounding_box", alias = "bbox")]
    pub bounding_box: DetectionBox,
    /// Identity or type tag (e.g. "face")
    #[serde(default, alias = "type", alias = "kind")]
    pub label: Option<String>,
    /// Track identity, stable across frames when the detector provides one
    #[serde(
        default,
        alias = "trackId",
        alias = "track_id",
        deserialize_with = "deserialize_opt_id"
    )]
    pub id: Option<String>,
    /// Timestamp in seconds
    #[serde(default)]
    pub time: Option<f64>,
    /// Detector confidence (0.0-1.0)
    #[serde(default, alias = "confidence")]
    pub score: Option<f64>,
}

impl Detection {
    /// Untimed, unlabelled detection.
    pub fn new(bounding_box: DetectionBox) -> Self {
        Self {
            bounding_box,
            label: None,
            id: None,
            time: None,
            score: None,
        }
    }

    /// Face detection with a track id at a point in time.
    pub fn face_at(time: f64, id: impl Into<String>, bounding_box: DetectionBox) -> Self {
        Self {
            bounding_box,
            label: Some("face".to_string()),
            id: Some(id.into()),
            time: Some(time),
            score: None,
        }
    }

    /// Absolute box clamped to the frame, or `None` if nothing usable remains.
    pub fn absolute_box(&self, frame: &FrameDimensions) -> Option<BoundingBox> {
        self.bounding_box.to_absolute(frame).clamp_to(frame)
    }
}

/// Accept ids as strings or numbers.
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
