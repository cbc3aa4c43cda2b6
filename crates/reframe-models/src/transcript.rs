//! Transcript segments and the speaker timing derived from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::timestamp::{parse_transcript_timestamp, TimestampError};

/// Transcript segment as stored, with string timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub speaker: Option<String>,
}

impl TranscriptSegment {
    /// Convert to a speaker segment.
    ///
    /// Returns `Ok(None)` for segments without a speaker label.
    pub fn to_speaker_segment(&self) -> Result<Option<SpeakerSegment>, TimestampError> {
        let speaker = match self.speaker.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(None),
        };

        Ok(Some(SpeakerSegment {
            speaker_id: speaker.to_string(),
            start_seconds: parse_transcript_timestamp(&self.start)?,
            end_seconds: parse_transcript_timestamp(&self.end)?,
        }))
    }
}

/// A span of time during which one speaker is talking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpeakerSegment {
    #[serde(alias = "speakerId", alias = "speaker")]
    pub speaker_id: String,
    #[serde(alias = "startSeconds", alias = "start")]
    pub start_seconds: f64,
    #[serde(alias = "endSeconds", alias = "end")]
    pub end_seconds: f64,
}

impl SpeakerSegment {
    pub fn new(speaker_id: impl Into<String>, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            start_seconds,
            end_seconds,
        }
    }

    /// Half-open containment: `start <= t < end`.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_seconds && t < self.end_seconds
    }

    /// Finite, non-negative and strictly increasing bounds.
    pub fn is_well_formed(&self) -> bool {
        self.start_seconds.is_finite()
            && self.end_seconds.is_finite()
            && self.start_seconds >= 0.0
            && self.end_seconds > self.start_seconds
    }

    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_to_speaker_segment() {
        let seg = TranscriptSegment {
            start: "00:01:500".to_string(),
            end: "00:04".to_string(),
            text: "hello".to_string(),
            speaker: Some("A".to_string()),
        };
        let speaker = seg.to_speaker_segment().unwrap().unwrap();
        assert_eq!(speaker.speaker_id, "A");
        assert!((speaker.start_seconds - 1.5).abs() < 1e-9);
        assert_eq!(speaker.end_seconds, 4.0);
    }

    #[test]
    fn test_unlabelled_segment_is_skipped() {
        let seg = TranscriptSegment {
            start: "00:00".to_string(),
            end: "00:01".to_string(),
            text: String::new(),
            speaker: Some("  ".to_string()),
        };
        assert_eq!(seg.to_speaker_segment().unwrap(), None);
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let seg = TranscriptSegment {
            start: "soon".to_string(),
            end: "00:01".to_string(),
            text: String::new(),
            speaker: Some("A".to_string()),
        };
        assert!(seg.to_speaker_segment().is_err());
    }

    #[test]
    fn test_half_open_containment() {
        let seg = SpeakerSegment::new("A", 1.0, 2.0);
        assert!(seg.contains(1.0));
        assert!(seg.contains(1.999));
        assert!(!seg.contains(2.0));
        assert!(seg.is_well_formed());
        assert!(!SpeakerSegment::new("A", 2.0, 2.0).is_well_formed());
    }
}
