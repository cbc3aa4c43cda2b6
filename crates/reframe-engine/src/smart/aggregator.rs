//! Reduce detections to a single subject envelope in absolute pixels.

use reframe_models::{BoundingBox, Detection, FrameDimensions};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Union bounding box of all usable detections.
///
/// `is_valid == false` means no usable detection existed and the fallback
/// crop must be used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectEnvelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub is_valid: bool,
}

impl SubjectEnvelope {
    /// Envelope marking the absence of a subject.
    pub fn invalid() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
            is_valid: false,
        }
    }

    /// Envelope around a single box. Zero-area boxes yield an invalid envelope.
    pub fn from_box(bbox: &BoundingBox) -> Self {
        let is_valid = bbox.width > 0.0 && bbox.height > 0.0 && bbox.area().is_finite();
        Self {
            min_x: bbox.x,
            min_y: bbox.y,
            max_x: bbox.x2(),
            max_y: bbox.y2(),
            is_valid,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Valid and with positive area.
    pub fn is_usable(&self) -> bool {
        self.is_valid && self.width() > 0.0 && self.height() > 0.0
    }

    pub fn as_box(&self) -> BoundingBox {
        BoundingBox::from_edges(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Aggregate detections into one envelope.
///
/// Fractional and absolute boxes are normalized to absolute pixels and clamped
/// to the frame; boxes with nothing left inside the frame are dropped.
pub fn aggregate(detections: &[Detection], frame: &FrameDimensions) -> SubjectEnvelope {
    let boxes: Vec<BoundingBox> = detections
        .iter()
        .filter_map(|d| d.absolute_box(frame))
        .collect();

    let dropped = detections.len() - boxes.len();
    if dropped > 0 {
        debug!(
            dropped,
            total = detections.len(),
            "Dropped detections outside frame or with zero area"
        );
    }

    let envelope = match BoundingBox::union(&boxes) {
        Some(union) => SubjectEnvelope::from_box(&union),
        None => SubjectEnvelope::invalid(),
    };

    if !envelope.is_usable() {
        warn!(
            detections = detections.len(),
            frame = %frame,
            "No usable subject envelope, fallback crop will be used"
        );
        return SubjectEnvelope::invalid();
    }

    debug!(
        min_x = envelope.min_x,
        min_y = envelope.min_y,
        max_x = envelope.max_x,
        max_y = envelope.max_y,
        "Subject envelope"
    );
    envelope
}
