//! Shared data models for the smart reframing engine.
//!
//! This crate provides Serde-serializable types for:
//! - Frame dimensions and pixel-space bounding boxes
//! - Subject detections in absolute or fractional coordinates
//! - Target aspect ratios and platform presets
//! - Crop rectangles handed to the transcoder
//! - Transcript speaker segments and their timestamps

pub mod crop;
pub mod detection;
pub mod geometry;
pub mod target;
pub mod timestamp;
pub mod transcript;

// Re-export common types
pub use crop::CropRect;
pub use detection::{Detection, DetectionBox};
pub use geometry::{BoundingBox, FrameDimensions, VideoMetadata};
pub use target::{Orientation, Platform, TargetRatio, TargetRatioParseError};
pub use timestamp::{format_transcript_timestamp, parse_transcript_timestamp, TimestampError};
pub use transcript::{SpeakerSegment, TranscriptSegment};
