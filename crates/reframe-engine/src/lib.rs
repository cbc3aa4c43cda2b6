//! Smart reframing engine.
//!
//! This crate provides:
//! - Subject envelope aggregation from absolute or fractional detections
//! - Orientation-aware crop geometry with even, in-frame rectangles
//! - Safety-margin validation for caller-supplied crops
//! - Speaker to face mapping and director-cut crop timelines
//! - FFmpeg filter synthesis and a cancellable FFmpeg runner

pub mod command;
pub mod error;
pub mod filters;
pub mod planner;
pub mod render;
pub mod smart;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{ReframeError, ReframeResult};
pub use planner::{speaker_segments, ReframeMode, ReframePlan, ReframePlanner, ReframeRequest};
pub use render::{preview_command, preview_output_path, render_command};
pub use smart::{
    aggregate, build_timeline, map_speakers_to_faces, validate_crop, visual_director_timeline,
    CropEngine, CropTimeline, ReframeConfig, SpeakerCropMap, SubjectEnvelope, TimeInterval,
};
