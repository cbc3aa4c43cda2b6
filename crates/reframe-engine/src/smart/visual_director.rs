//! Detection-driven director cut, for when no transcript speakers are known.
//!
//! Time-stamped detections are bucketed, the most central face in each bucket
//! becomes the protagonist, and consecutive buckets with the same protagonist
//! form a scene framed by one averaged crop.

use std::collections::BTreeMap;

use reframe_models::{BoundingBox, Detection, TargetRatio};
use tracing::{debug, info, warn};

use super::aggregator::SubjectEnvelope;
use super::crop_engine::CropEngine;
use super::timeline::{CropTimeline, TimeInterval};

const DEFAULT_BUCKET_SECS: f64 = 0.1;
const UNTRACKED: &str = "untracked";

/// A run of buckets sharing one protagonist.
#[derive(Debug, Clone, PartialEq)]
struct Scene {
    protagonist: String,
    start: f64,
    boxes: Vec<BoundingBox>,
}

impl Scene {
    fn average_box(&self) -> BoundingBox {
        let n = self.boxes.len().max(1) as f64;
        let (x, y, w, h) = self.boxes.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, b| {
            (acc.0 + b.x, acc.1 + b.y, acc.2 + b.width, acc.3 + b.height)
        });
        BoundingBox::new(x / n, y / n, w / n, h / n)
    }
}

/// Build a timeline that follows the most central face over time.
///
/// The first scene is held from 0 and the last one until the end of the video.
/// Returns `None` when no detection carries a timestamp and a usable box.
pub fn visual_director_timeline(
    engine: &CropEngine,
    detections: &[Detection],
    target: &TargetRatio,
    video_duration: f64,
) -> Option<CropTimeline> {
    let frame = engine.frame();
    let bucket_secs = match engine.config().scene_bucket_secs {
        b if b > 0.0 && b.is_finite() => b,
        _ => DEFAULT_BUCKET_SECS,
    };

    let mut buckets: BTreeMap<i64, Vec<(&Detection, BoundingBox)>> = BTreeMap::new();
    for detection in detections {
        let Some(time) = detection.time.filter(|t| t.is_finite() && *t >= 0.0) else {
            continue;
        };
        let Some(bbox) = detection.absolute_box(frame) else {
            continue;
        };
        let key = (time / bucket_secs).round() as i64;
        buckets.entry(key).or_default().push((detection, bbox));
    }

    if buckets.is_empty() {
        warn!(
            detections = detections.len(),
            "No time-stamped detections, cannot build visual director cut"
        );
        return None;
    }

    let frame_cx = frame.width as f64 / 2.0;
    let mut scenes: Vec<Scene> = Vec::new();
    for (key, members) in &buckets {
        let Some((detection, bbox)) = most_central(members, frame_cx) else {
            continue;
        };
        let protagonist = detection.id.as_deref().unwrap_or(UNTRACKED);
        let time = *key as f64 * bucket_secs;

        match scenes.last_mut() {
            Some(scene) if scene.protagonist == protagonist => scene.boxes.push(bbox),
            _ => scenes.push(Scene {
                protagonist: protagonist.to_string(),
                start: time,
                boxes: vec![bbox],
            }),
        }
    }

    let fallback = engine.crop_for_detections(detections, target);
    let mut timeline = CropTimeline::new(fallback, video_duration);

    let last_bucket_end = buckets
        .keys()
        .next_back()
        .map(|k| (*k + 1) as f64 * bucket_secs)
        .unwrap_or(0.0);
    let tail_end = last_bucket_end.max(video_duration);

    for (i, scene) in scenes.iter().enumerate() {
        let start = if i == 0 { 0.0 } else { scene.start };
        let end = scenes.get(i + 1).map(|next| next.start).unwrap_or(tail_end);
        let envelope = SubjectEnvelope::from_box(&scene.average_box());
        let crop = engine.compute_crop(&envelope, target);

        debug!(
            protagonist = %scene.protagonist,
            start,
            end,
            samples = scene.boxes.len(),
            crop_x = crop.x,
            crop_y = crop.y,
            "Visual director scene"
        );
        timeline.push(scene.protagonist.clone(), TimeInterval::new(start, end), crop);
    }

    info!(
        scenes = scenes.len(),
        buckets = buckets.len(),
        "Generated visual director timeline"
    );
    Some(timeline)
}

/// Face whose horizontal center is closest to the frame center; earliest wins ties.
fn most_central<'a>(
    members: &[(&'a Detection, BoundingBox)],
    frame_cx: f64,
) -> Option<(&'a Detection, BoundingBox)> {
    let mut best: Option<(&'a Detection, BoundingBox)> = None;
    for (detection, bbox) in members {
        let distance = (bbox.cx() - frame_cx).abs();
        match best {
            Some((_, current)) if (current.cx() - frame_cx).abs() <= distance => {}
            _ => best = Some((*detection, *bbox)),
        }
    }
    best
}
