//! Speaker label to face pairing for multi-speaker framing.
//!
//! Pairing is positional: labels sorted lexicographically, faces sorted left to
//! right, i-th with i-th. Nothing correlates voices with faces, so the result
//! is a best-effort guess that is at least stable for the same input.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use reframe_models::{BoundingBox, CropRect, Detection, TargetRatio};
use serde::Serialize;
use tracing::{debug, warn};

use super::aggregator::SubjectEnvelope;
use super::crop_engine::CropEngine;

/// Per-speaker crops plus the wide-shot fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerCropMap {
    default: CropRect,
    speakers: BTreeMap<String, CropRect>,
}

impl SpeakerCropMap {
    pub fn new(default: CropRect) -> Self {
        Self {
            default,
            speakers: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, speaker_id: impl Into<String>, crop: CropRect) {
        self.speakers.insert(speaker_id.into(), crop);
    }

    /// Wide shot computed from all faces.
    pub fn default_crop(&self) -> &CropRect {
        &self.default
    }

    /// Crop for a mapped speaker.
    pub fn get(&self, speaker_id: &str) -> Option<&CropRect> {
        self.speakers.get(speaker_id)
    }

    /// Crop for a speaker, or the default when unmapped.
    pub fn resolve(&self, speaker_id: &str) -> &CropRect {
        self.get(speaker_id).unwrap_or(&self.default)
    }

    /// Mapped speaker ids in sorted order.
    pub fn mapped_speakers(&self) -> impl Iterator<Item = &str> {
        self.speakers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    /// No speaker got a face.
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}

/// Pair speaker labels with faces and compute one crop per mapped speaker.
///
/// Duplicate labels collapse. Faces with no usable box inside the frame are
/// ignored. Excess labels or faces stay unmapped and resolve to the default.
pub fn map_speakers_to_faces<S: AsRef<str>>(
    engine: &CropEngine,
    labels: &[S],
    faces: &[Detection],
    target: &TargetRatio,
) -> SpeakerCropMap {
    let frame = engine.frame();
    let mut map = SpeakerCropMap::new(engine.crop_for_detections(faces, target));

    let sorted_labels: Vec<&str> = labels
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut boxes: Vec<BoundingBox> = faces.iter().filter_map(|f| f.absolute_box(frame)).collect();
    boxes.sort_by(left_to_right);

    if sorted_labels.len() != boxes.len() {
        warn!(
            speakers = sorted_labels.len(),
            faces = boxes.len(),
            "Ambiguous speaker mapping, excess entries left unmapped"
        );
    }

    for (label, face) in sorted_labels.iter().zip(boxes.iter()) {
        let crop = engine.compute_crop(&SubjectEnvelope::from_box(face), target);
        debug!(
            speaker = label,
            face_x = face.x,
            crop_x = crop.x,
            crop_width = crop.width,
            "Mapped speaker to face"
        );
        map.insert(*label, crop);
    }

    map
}

fn left_to_right(a: &BoundingBox, b: &BoundingBox) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.width.total_cmp(&b.width))
        .then(a.height.total_cmp(&b.height))
}
