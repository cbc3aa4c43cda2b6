//! Smart reframing: detections and a target ratio in, crop rectangles out.
//!
//! # Architecture
//!
//! ```text
//!  Detections ──► Aggregator ──► SubjectEnvelope
//!                                      │
//!                                      ▼
//!  TargetRatio ──────────────────► CropEngine ──► CropRect ──► Validator (manual crops)
//!                                      │
//!  Transcript ──► SpeakerSegments      ▼
//!        │                      Speaker mapper ──► SpeakerCropMap
//!        ▼                             │
//!  build_timeline ◄────────────────────┘
//!        │
//!        ▼
//!  CropTimeline ──► filters (transcoder expression)
//! ```
//!
//! Without speakers, [`visual_director_timeline`] builds the timeline from
//! time-stamped detections instead.

pub mod aggregator;
pub mod config;
pub mod crop_engine;
pub mod speaker_mapping;
pub mod timeline;
pub mod validator;
pub mod visual_director;

pub use aggregator::{aggregate, SubjectEnvelope};
pub use config::{Padding, ReframeConfig};
pub use crop_engine::CropEngine;
pub use speaker_mapping::{map_speakers_to_faces, SpeakerCropMap};
pub use timeline::{build_timeline, CropTimeline, TimeInterval, TimelineEntry};
pub use validator::validate_crop;
pub use visual_director::visual_director_timeline;
