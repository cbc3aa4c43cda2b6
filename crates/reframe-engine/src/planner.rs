//! Request-level planning: one reframe request in, one crop plan out.

use std::collections::BTreeSet;
use std::fmt;

use reframe_models::{
    format_transcript_timestamp, CropRect, Detection, FrameDimensions, Platform, SpeakerSegment,
    TargetRatio, TranscriptSegment, VideoMetadata,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ReframeResult;
use crate::filters::{crop_filter, timeline_crop_filter};
use crate::smart::{
    build_timeline, map_speakers_to_faces, validate_crop, visual_director_timeline, CropEngine,
    CropTimeline, ReframeConfig,
};

/// How the crop may change over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReframeMode {
    /// One crop for the whole video
    #[default]
    Static,
    /// Follow the active transcript speaker
    DirectorCut,
    /// Follow the most central face over time
    VisualDirector,
}

impl ReframeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReframeMode::Static => "static",
            ReframeMode::DirectorCut => "director_cut",
            ReframeMode::VisualDirector => "visual_director",
        }
    }
}

impl fmt::Display for ReframeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reframe request as received from the surrounding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeRequest {
    pub video: VideoMetadata,
    /// Platform id (`"tiktok"`) or literal ratio (`"9:16"`)
    #[serde(alias = "targetPlatform", alias = "platform")]
    pub target: String,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub transcript: Vec<TranscriptSegment>,
    #[serde(default)]
    pub mode: ReframeMode,
    /// Caller-adjusted crop; validated before use
    #[serde(default, alias = "manualCrop")]
    pub manual_crop: Option<CropRect>,
}

impl ReframeRequest {
    pub fn from_json(json: &str) -> ReframeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Output of planning, ready for the transcoder.
#[derive(Debug, Clone, Serialize)]
pub struct ReframePlan {
    pub target: TargetRatio,
    pub frame: FrameDimensions,
    /// Mode actually used after any degradation
    pub mode_used: ReframeMode,
    /// Static crop for the whole video; timelines carry their own fallback
    pub crop: CropRect,
    pub timeline: Option<CropTimeline>,
    /// Crop filter for the transcoder
    pub filter: String,
    /// Platform output size when the target is a platform preset
    pub output_size: Option<(u32, u32)>,
}

/// Plans crops for reframe requests.
#[derive(Debug, Clone, Default)]
pub struct ReframePlanner {
    config: ReframeConfig,
}

impl ReframePlanner {
    pub fn new(config: ReframeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReframeConfig {
        &self.config
    }

    /// Plan a request.
    ///
    /// Fails only on structurally invalid input: bad frame size, unparseable
    /// target, or a manual crop larger than the frame. Director modes without
    /// usable input fall back to the static crop.
    pub fn plan(&self, request: &ReframeRequest) -> ReframeResult<ReframePlan> {
        let frame = request.video.frame();
        let engine = CropEngine::new(self.config.clone(), frame)?;
        let target = TargetRatio::resolve(&request.target)?;
        let platform = request.target.parse::<Platform>().ok();

        info!(
            frame = %frame,
            target = %target,
            mode = %request.mode,
            detections = request.detections.len(),
            segments = request.transcript.len(),
            "Planning reframe"
        );

        let crop = match request.manual_crop {
            Some(manual) => validate_crop(manual, &frame, self.config.safety_margin)?,
            None => engine.crop_for_detections(&request.detections, &target),
        };

        let timeline = match request.mode {
            ReframeMode::Static => None,
            ReframeMode::DirectorCut => self.director_cut(&engine, request, &target),
            ReframeMode::VisualDirector => visual_director_timeline(
                &engine,
                &request.detections,
                &target,
                request.video.duration_seconds,
            ),
        }
        .map(|timeline| timeline.with_common_size(&frame));

        let mode_used = match (&timeline, request.mode) {
            (None, ReframeMode::Static) => ReframeMode::Static,
            (None, requested) => {
                warn!(
                    requested = %requested,
                    "No timeline could be built, using static crop for the whole video"
                );
                ReframeMode::Static
            }
            (Some(_), requested) => requested,
        };

        let filter = match &timeline {
            Some(timeline) => {
                for entry in timeline.entries() {
                    debug!(
                        label = %entry.label,
                        start = %format_transcript_timestamp(entry.interval.start),
                        end = %format_transcript_timestamp(entry.interval.end),
                        x = entry.crop.x,
                        y = entry.crop.y,
                        "Timeline entry"
                    );
                }
                timeline_crop_filter(timeline)
            }
            None => crop_filter(&crop),
        };

        Ok(ReframePlan {
            target,
            frame,
            mode_used,
            crop,
            timeline,
            filter,
            output_size: platform.map(|p| p.output_size()),
        })
    }

    fn director_cut(
        &self,
        engine: &CropEngine,
        request: &ReframeRequest,
        target: &TargetRatio,
    ) -> Option<CropTimeline> {
        let segments = speaker_segments(&request.transcript);
        let labels: BTreeSet<&str> = segments.iter().map(|s| s.speaker_id.as_str()).collect();
        let labels: Vec<&str> = labels.into_iter().collect();

        let faces: Vec<Detection> = request
            .detections
            .iter()
            .filter(|d| is_face(d))
            .cloned()
            .collect();

        let map = map_speakers_to_faces(engine, &labels, &faces, target);
        build_timeline(&segments, &map, map.default_crop(), request.video.duration_seconds)
    }
}

/// Unlabelled detections count as faces.
fn is_face(detection: &Detection) -> bool {
    detection
        .label
        .as_deref()
        .map(|l| l.eq_ignore_ascii_case("face"))
        .unwrap_or(true)
}

/// Convert transcript segments, skipping unlabelled or unparseable ones.
pub fn speaker_segments(transcript: &[TranscriptSegment]) -> Vec<SpeakerSegment> {
    let mut segments = Vec::with_capacity(transcript.len());
    for (index, segment) in transcript.iter().enumerate() {
        match segment.to_speaker_segment() {
            Ok(Some(speaker)) => segments.push(speaker),
            Ok(None) => {
                debug!(index, "Transcript segment has no speaker, skipping");
            }
            Err(e) => {
                warn!(
                    index,
                    start = %segment.start,
                    end = %segment.end,
                    error = %e,
                    "Skipping transcript segment with invalid timestamp"
                );
            }
        }
    }
    segments
}
