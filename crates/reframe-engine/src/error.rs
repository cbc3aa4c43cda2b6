//! Error types for reframe operations.

use thiserror::Error;

/// Result type for reframe operations.
pub type ReframeResult<T> = Result<T, ReframeError>;

/// Errors surfaced to callers.
///
/// "No usable input" conditions (no detections, unmapped speakers, empty
/// timelines) are not errors: they degrade to a fallback crop and are logged.
/// Only structurally invalid input and transcoder failures end up here.
#[derive(Debug, Error)]
pub enum ReframeError {
    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidFrameDimensions { width: i32, height: i32 },

    #[error(
        "Crop {width}x{height} cannot be repositioned inside {frame_width}x{frame_height} frame"
    )]
    OutOfBounds {
        width: i32,
        height: i32,
        frame_width: i32,
        frame_height: i32,
    },

    #[error("Invalid target: {0}")]
    InvalidTarget(#[from] reframe_models::TargetRatioParseError),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] reframe_models::TimestampError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("FFmpeg not found in PATH")]
    TranscoderNotFound,

    #[error("FFmpeg command failed: {message}")]
    TranscoderFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ReframeError {
    /// Create an invalid frame dimensions error.
    pub fn invalid_frame(frame: &reframe_models::FrameDimensions) -> Self {
        Self::InvalidFrameDimensions {
            width: frame.width,
            height: frame.height,
        }
    }

    /// Create a transcoder failure error.
    pub fn transcoder_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::TranscoderFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Whether the caller supplied structurally invalid input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFrameDimensions { .. }
                | Self::OutOfBounds { .. }
                | Self::InvalidTarget(_)
                | Self::InvalidTimestamp(_)
                | Self::InvalidRequest(_)
                | Self::JsonParse(_)
        )
    }
}

/// Reject zero or negative frame sizes.
pub fn ensure_valid_frame(frame: &reframe_models::FrameDimensions) -> ReframeResult<()> {
    if frame.is_valid() {
        Ok(())
    } else {
        Err(ReframeError::invalid_frame(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_models::FrameDimensions;

    #[test]
    fn test_error_display() {
        let err = ReframeError::invalid_frame(&FrameDimensions::new(0, 720));
        assert!(err.to_string().contains("0x720"));
        assert!(err.is_caller_error());

        let err = ReframeError::transcoder_failed("boom", None, Some(1));
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_ensure_valid_frame() {
        assert!(ensure_valid_frame(&FrameDimensions::new(1920, 1080)).is_ok());
        assert!(matches!(
            ensure_valid_frame(&FrameDimensions::new(-5, 1080)),
            Err(ReframeError::InvalidFrameDimensions { width: -5, height: 1080 })
        ));
    }
}
