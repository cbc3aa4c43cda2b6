//! Property tests for crop geometry, validation, mapping and timelines.

use proptest::prelude::*;

use reframe_engine::{
    build_timeline, map_speakers_to_faces, validate_crop, CropEngine, ReframeConfig,
    SpeakerCropMap, SubjectEnvelope,
};
use reframe_models::{
    BoundingBox, CropRect, Detection, DetectionBox, FrameDimensions, SpeakerSegment, TargetRatio,
};

const RATIOS: &[(u32, u32)] = &[(9, 16), (1, 1), (16, 9), (4, 5), (4, 3), (21, 9), (2, 3)];

fn frame_strategy() -> impl Strategy<Value = FrameDimensions> {
    (64i32..4000, 64i32..4000).prop_map(|(w, h)| FrameDimensions::new(w, h))
}

fn target_strategy() -> impl Strategy<Value = TargetRatio> {
    prop::sample::select(RATIOS).prop_map(|(w, h)| TargetRatio::new(w, h, format!("{}:{}", w, h)))
}

/// Frame plus an envelope fully inside it.
fn scene_strategy() -> impl Strategy<Value = (FrameDimensions, SubjectEnvelope)> {
    frame_strategy().prop_flat_map(|frame| {
        let fw = frame.width as f64;
        let fh = frame.height as f64;
        (0.0..fw - 8.0, 0.0..fh - 8.0).prop_flat_map(move |(x, y)| {
            (8.0..=(fw - x), 8.0..=(fh - y)).prop_map(move |(w, h)| {
                (frame, SubjectEnvelope::from_box(&BoundingBox::new(x, y, w, h)))
            })
        })
    })
}

fn assert_crop_invariants(
    crop: &CropRect,
    frame: &FrameDimensions,
    target: &TargetRatio,
) -> Result<(), TestCaseError> {
    prop_assert!(crop.fits_within(frame), "{:?} outside {}", crop, frame);
    prop_assert!(crop.is_encoder_friendly(), "odd size {:?}", crop);
    let tolerance = 1.0 / crop.width.min(crop.height) as f64;
    prop_assert!(
        (crop.ratio() - target.ratio()).abs() < tolerance,
        "ratio {} vs {} for {:?}",
        crop.ratio(),
        target.ratio(),
        crop
    );
    prop_assert!((crop.zoom_factor - frame.width as f64 / crop.width as f64).abs() < 1e-9);
    Ok(())
}

proptest! {
    /// Every computed crop is inside the frame, even and on ratio.
    #[test]
    fn crop_is_contained_even_and_on_ratio(
        (frame, envelope) in scene_strategy(),
        target in target_strategy(),
    ) {
        let engine = CropEngine::new(ReframeConfig::default(), frame).unwrap();
        let crop = engine.compute_crop(&envelope, &target);
        assert_crop_invariants(&crop, &frame, &target)?;
    }

    /// Without a subject the crop is centered within a pixel.
    #[test]
    fn fallback_is_centered(frame in frame_strategy(), target in target_strategy()) {
        let engine = CropEngine::new(ReframeConfig::default(), frame).unwrap();
        let crop = engine.compute_crop(&SubjectEnvelope::invalid(), &target);

        assert_crop_invariants(&crop, &frame, &target)?;
        prop_assert!((crop.center_x - frame.width as f64 / 2.0).abs() <= 1.0);
        prop_assert!((crop.center_y - frame.height as f64 / 2.0).abs() <= 1.0);
    }

    /// Crops already inside the margins are returned unchanged.
    #[test]
    fn validate_is_idempotent_in_bounds(
        frame in frame_strategy(),
        margin in 0i32..8,
        w_frac in 0.05f64..1.0,
        h_frac in 0.05f64..1.0,
        x_frac in 0.0f64..=1.0,
        y_frac in 0.0f64..=1.0,
    ) {
        let w = (((frame.width - 2 * margin) as f64 * w_frac) as i32).max(1);
        let h = (((frame.height - 2 * margin) as f64 * h_frac) as i32).max(1);
        let x = margin + ((frame.width - 2 * margin - w) as f64 * x_frac) as i32;
        let y = margin + ((frame.height - 2 * margin - h) as f64 * y_frac) as i32;
        let crop = CropRect::new(x, y, w, h, &frame);

        prop_assert_eq!(validate_crop(crop, &frame, margin).unwrap(), crop);
        // And again on its own output
        let once = validate_crop(crop, &frame, margin).unwrap();
        prop_assert_eq!(validate_crop(once, &frame, margin).unwrap(), once);
    }

    /// A crop pushed past one edge by `d` comes back with the same size and
    /// that edge exactly at the margin.
    #[test]
    fn validate_corrects_single_edge(
        frame in frame_strategy(),
        margin in 0i32..8,
        d in 1i32..200,
        edge in 0u8..4,
        size_frac in 0.1f64..0.5,
    ) {
        let w = ((frame.width as f64 * size_frac) as i32).max(2);
        let h = ((frame.height as f64 * size_frac) as i32).max(2);
        let cx = (frame.width - w) / 2;
        let cy = (frame.height - h) / 2;
        let (x, y) = match edge {
            0 => (margin - d, cy),
            1 => (frame.width - margin - w + d, cy),
            2 => (cx, margin - d),
            _ => (cx, frame.height - margin - h + d),
        };
        let crop = CropRect::new(x, y, w, h, &frame);
        let fixed = validate_crop(crop, &frame, margin).unwrap();

        prop_assert_eq!((fixed.width, fixed.height), (w, h));
        match edge {
            0 => prop_assert_eq!(fixed.x, margin),
            1 => prop_assert_eq!(fixed.right(), frame.width - margin),
            2 => prop_assert_eq!(fixed.y, margin),
            _ => prop_assert_eq!(fixed.bottom(), frame.height - margin),
        }
    }

    /// Best-effort pairing does not depend on input order.
    #[test]
    fn mapping_is_order_independent(
        xs in prop::collection::btree_set(0u32..1700, 1..5),
        n_labels in 1usize..6,
        seed in any::<u64>(),
    ) {
        let frame = FrameDimensions::new(1920, 1080);
        let engine = CropEngine::new(ReframeConfig::default(), frame).unwrap();
        let target = TargetRatio::new(9, 16, "9:16");

        let faces: Vec<Detection> = xs
            .iter()
            .map(|x| Detection::new(DetectionBox::absolute(*x as f64, 300.0, 200.0, 200.0)))
            .collect();
        let labels: Vec<String> = (0..n_labels).map(|i| format!("SPEAKER_{}", i)).collect();

        // Deterministic rotation as the permutation
        let shift = (seed as usize) % faces.len();
        let mut rotated_faces = faces.clone();
        rotated_faces.rotate_left(shift);
        let mut reversed_labels = labels.clone();
        reversed_labels.reverse();

        let a = map_speakers_to_faces(&engine, &labels, &faces, &target);
        let b = map_speakers_to_faces(&engine, &reversed_labels, &rotated_faces, &target);
        prop_assert_eq!(a, b);
    }

    /// Every instant up to the last segment end resolves to the first segment
    /// containing it, or to the fallback; the interval partition has no gaps.
    #[test]
    fn timeline_covers_every_instant(
        raw in prop::collection::vec((0u32..3, 0u32..200, 1u32..50), 1..12),
        samples in prop::collection::vec(0.0f64..1.0, 1..40),
    ) {
        let frame = FrameDimensions::new(1920, 1080);
        let fallback = CropRect::new(688, 54, 546, 972, &frame);
        let mut map = SpeakerCropMap::new(fallback);
        map.insert("S0", CropRect::new(0, 0, 282, 500, &frame));
        map.insert("S1", CropRect::new(800, 0, 282, 500, &frame));
        // S2 stays unmapped

        let segments: Vec<SpeakerSegment> = raw
            .iter()
            .map(|(s, start, len)| {
                let start = *start as f64 / 10.0;
                SpeakerSegment::new(format!("S{}", s), start, start + *len as f64 / 10.0)
            })
            .collect();
        let last_end = segments.iter().map(|s| s.end_seconds).fold(0.0, f64::max);

        let timeline = build_timeline(&segments, &map, &fallback, 0.0).unwrap();

        for p in samples {
            let t = p * last_end;
            let expected = segments
                .iter()
                .find(|s| s.contains(t))
                .map(|s| *map.resolve(&s.speaker_id))
                .unwrap_or(fallback);
            prop_assert_eq!(*timeline.resolve(t), expected);
        }

        let intervals = timeline.intervals();
        prop_assert_eq!(intervals[0].0.start, 0.0);
        prop_assert_eq!(intervals[intervals.len() - 1].0.end, last_end);
        for pair in intervals.windows(2) {
            prop_assert_eq!(pair[0].0.end, pair[1].0.start);
        }
    }
}
