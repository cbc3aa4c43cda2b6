//! Time-indexed crop selection for director-cut rendering.
//!
//! The timeline is an ordered list of `(interval, crop)` entries plus a
//! fallback. Serialization to the transcoder expression language happens in
//! [`crate::filters`], never here.

use reframe_models::{CropRect, FrameDimensions, SpeakerSegment};
use serde::Serialize;
use tracing::{debug, warn};

use super::crop_engine::{floor_even, round_even};
use super::speaker_mapping::SpeakerCropMap;

/// Half-open time interval `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeInterval {
    pub start: f64,
    pub end: f64,
}

impl TimeInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// One timeline entry, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Speaker id, or scene protagonist for detection-driven timelines
    pub label: String,
    pub interval: TimeInterval,
    pub crop: CropRect,
}

/// Ordered crop entries with first-match-wins lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropTimeline {
    entries: Vec<TimelineEntry>,
    fallback: CropRect,
    video_duration: f64,
}

impl CropTimeline {
    pub fn new(fallback: CropRect, video_duration: f64) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
            video_duration: video_duration.max(0.0),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, interval: TimeInterval, crop: CropRect) {
        self.entries.push(TimelineEntry {
            label: label.into(),
            interval,
            crop,
        });
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn fallback(&self) -> &CropRect {
        &self.fallback
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End of the covered range: the later of the last entry end and the video duration.
    pub fn end(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.interval.end)
            .fold(self.video_duration, f64::max)
    }

    /// Crop active at `t`.
    ///
    /// The first entry containing `t` wins; anything uncovered gets the fallback.
    pub fn resolve(&self, t: f64) -> &CropRect {
        self.entries
            .iter()
            .find(|e| e.interval.contains(t))
            .map(|e| &e.crop)
            .unwrap_or(&self.fallback)
    }

    /// Gap-free, ordered partition of `[0, end())` with the crop active on each piece.
    ///
    /// Adjacent pieces with the same crop are merged.
    pub fn intervals(&self) -> Vec<(TimeInterval, CropRect)> {
        let end = self.end();
        if end <= 0.0 {
            return Vec::new();
        }

        let mut breakpoints: Vec<f64> = vec![0.0, end];
        for entry in &self.entries {
            breakpoints.push(entry.interval.start);
            breakpoints.push(entry.interval.end);
        }
        breakpoints.retain(|t| *t >= 0.0 && *t <= end);
        breakpoints.sort_by(f64::total_cmp);
        breakpoints.dedup();

        let mut pieces: Vec<(TimeInterval, CropRect)> = Vec::new();
        for pair in breakpoints.windows(2) {
            let (start, stop) = (pair[0], pair[1]);
            let crop = *self.resolve(start);
            match pieces.last_mut() {
                Some((interval, last)) if *last == crop => interval.end = stop,
                _ => pieces.push((TimeInterval::new(start, stop), crop)),
            }
        }
        pieces
    }

    /// Width and height shared by every crop, if they all agree.
    pub fn common_size(&self) -> Option<(i32, i32)> {
        let size = (self.fallback.width, self.fallback.height);
        self.entries
            .iter()
            .all(|e| (e.crop.width, e.crop.height) == size)
            .then_some(size)
    }

    /// Copy of the timeline in which every crop has the same size.
    ///
    /// The transcoder fixes the crop size once, at initialization, and only
    /// moves the window afterwards. The largest subject crop sets the size (the
    /// fallback only when no entry differs from it); every crop is re-centered
    /// on its own center at that size and shifted back inside the frame.
    pub fn with_common_size(&self, frame: &FrameDimensions) -> CropTimeline {
        let size = self
            .entries
            .iter()
            .map(|e| &e.crop)
            .filter(|crop| **crop != self.fallback)
            .max_by_key(|crop| i64::from(crop.width) * i64::from(crop.height))
            .map(|crop| (crop.width, crop.height))
            .unwrap_or((self.fallback.width, self.fallback.height));

        let entries = self
            .entries
            .iter()
            .map(|e| TimelineEntry {
                label: e.label.clone(),
                interval: e.interval,
                crop: resized_around_center(&e.crop, size, frame),
            })
            .collect();

        debug!(width = size.0, height = size.1, "Normalized timeline crop size");
        CropTimeline {
            entries,
            fallback: resized_around_center(&self.fallback, size, frame),
            video_duration: self.video_duration,
        }
    }
}

/// `crop` at `size`, keeping its center where the frame allows.
fn resized_around_center(crop: &CropRect, size: (i32, i32), frame: &FrameDimensions) -> CropRect {
    let (width, height) = size;
    if (crop.width, crop.height) == size {
        return *crop;
    }
    let x = round_even(crop.center_x - width as f64 / 2.0)
        .clamp(0, floor_even(frame.width - width).max(0));
    let y = round_even(crop.center_y - height as f64 / 2.0)
        .clamp(0, floor_even(frame.height - height).max(0));
    CropRect::new(x, y, width, height, frame)
}

/// Build a director-cut timeline from speaker segments.
///
/// Returns `None` when there are no usable segments or no speaker got a face;
/// callers then render the static default crop for the whole video.
pub fn build_timeline(
    segments: &[SpeakerSegment],
    map: &SpeakerCropMap,
    fallback: &CropRect,
    video_duration: f64,
) -> Option<CropTimeline> {
    if segments.is_empty() || map.is_empty() {
        debug!(
            segments = segments.len(),
            mapped = map.len(),
            "Nothing to cut between, no timeline"
        );
        return None;
    }

    let mut timeline = CropTimeline::new(*fallback, video_duration);
    for segment in segments {
        if !segment.is_well_formed() {
            warn!(
                speaker = %segment.speaker_id,
                start = segment.start_seconds,
                end = segment.end_seconds,
                "Skipping malformed speaker segment"
            );
            continue;
        }

        let crop = match map.get(&segment.speaker_id) {
            Some(crop) => *crop,
            None => {
                debug!(speaker = %segment.speaker_id, "Unmapped speaker, using fallback crop");
                *fallback
            }
        };

        timeline.push(
            segment.speaker_id.clone(),
            TimeInterval::new(segment.start_seconds, segment.end_seconds),
            crop,
        );
    }

    if timeline.is_empty() {
        warn!("No well-formed speaker segments, no timeline");
        return None;
    }

    debug!(
        entries = timeline.entries().len(),
        end = timeline.end(),
        "Built crop timeline"
    );
    Some(timeline)
}
