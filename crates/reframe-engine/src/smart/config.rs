//! Configuration for the smart reframing pipeline.
//!
//! All padding coefficients are empirically tuned, not derived.

use reframe_models::Orientation;
use serde::{Deserialize, Serialize};

/// Padding multipliers applied to the subject envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    /// Multiplier on content width
    pub horizontal: f64,
    /// Multiplier on content height
    pub vertical: f64,
}

impl Padding {
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Configuration for crop geometry, validation and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeConfig {
    // === Padding by orientation ===
    /// Vertical targets: narrow horizontal pad, large vertical search window
    pub vertical_padding: Padding,
    /// Square targets: symmetric, generous
    pub square_padding: Padding,
    /// Landscape targets
    pub landscape_padding: Padding,
    /// Ratios within this distance of 1.0 are treated as square (default: 0.01)
    pub square_tolerance: f64,

    // === Vertical framing ===
    /// Head extrapolated above the envelope, as a fraction of content height (default: 0.3)
    pub head_extension: f64,
    /// Lower body extrapolated below the envelope, as a fraction of content height (default: 1.2)
    pub body_extension: f64,
    /// Width-first sizing is used while the width-driven height stays within
    /// this multiple of the head/body window (default: 1.2)
    pub window_tolerance: f64,
    /// Height-first sizing never exceeds this fraction of frame height (default: 0.85)
    pub max_height_fraction: f64,
    /// Width-first crops are centered this fraction of content height above
    /// the subject center (default: 0.2)
    pub headroom_bias: f64,

    // === Fallback ===
    /// Fraction of the largest fitting rectangle used when no subject is known (default: 0.9)
    pub fallback_fill: f64,

    // === Validation ===
    /// Minimum distance in pixels from frame edges for previews (default: 2)
    pub safety_margin: i32,

    // === Visual director ===
    /// Detections closer than this in time are grouped together (seconds, default: 0.1)
    pub scene_bucket_secs: f64,

    // === Rendering ===
    /// FFmpeg x264 preset (default: "medium")
    pub render_preset: String,
    /// FFmpeg CRF quality (default: 23)
    pub render_crf: u8,
    /// Audio bitrate (default: "128k")
    pub audio_bitrate: String,
    /// Preview frame width in pixels (default: 400)
    pub preview_width: u32,
    /// Seek position for preview frames in seconds (default: 2.0)
    pub preview_at_secs: f64,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            vertical_padding: Padding::new(1.2, 2.5),
            square_padding: Padding::new(1.8, 1.8),
            landscape_padding: Padding::new(1.6, 1.4),
            square_tolerance: 0.01,

            head_extension: 0.3,
            body_extension: 1.2,
            window_tolerance: 1.2,
            max_height_fraction: 0.85,
            headroom_bias: 0.2,

            fallback_fill: 0.9,

            safety_margin: 2,

            scene_bucket_secs: 0.1,

            render_preset: "medium".to_string(),
            render_crf: 23,
            audio_bitrate: "128k".to_string(),
            preview_width: 400,
            preview_at_secs: 2.0,
        }
    }
}

impl ReframeConfig {
    /// Padding for an orientation class.
    pub fn padding_for(&self, orientation: Orientation) -> Padding {
        match orientation {
            Orientation::Vertical => self.vertical_padding,
            Orientation::Square => self.square_padding,
            Orientation::Landscape => self.landscape_padding,
        }
    }

    /// Tighter framing for talking-head content.
    pub fn tight() -> Self {
        Self {
            vertical_padding: Padding::new(1.1, 2.2),
            square_padding: Padding::new(1.5, 1.5),
            landscape_padding: Padding::new(1.4, 1.2),
            ..Default::default()
        }
    }

    /// Wider framing that keeps more context around subjects.
    pub fn wide() -> Self {
        Self {
            vertical_padding: Padding::new(1.5, 3.0),
            square_padding: Padding::new(2.2, 2.2),
            landscape_padding: Padding::new(2.0, 1.8),
            fallback_fill: 1.0,
            ..Default::default()
        }
    }

    /// Fast preset for quick renders.
    pub fn fast() -> Self {
        Self {
            render_preset: "ultrafast".to_string(),
            render_crf: 28,
            ..Default::default()
        }
    }

    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            vertical_padding: Padding::new(
                env_or("REFRAME_VERTICAL_PAD_X", defaults.vertical_padding.horizontal),
                env_or("REFRAME_VERTICAL_PAD_Y", defaults.vertical_padding.vertical),
            ),
            square_padding: Padding::new(
                env_or("REFRAME_SQUARE_PAD_X", defaults.square_padding.horizontal),
                env_or("REFRAME_SQUARE_PAD_Y", defaults.square_padding.vertical),
            ),
            landscape_padding: Padding::new(
                env_or("REFRAME_LANDSCAPE_PAD_X", defaults.landscape_padding.horizontal),
                env_or("REFRAME_LANDSCAPE_PAD_Y", defaults.landscape_padding.vertical),
            ),
            fallback_fill: env_or("REFRAME_FALLBACK_FILL", defaults.fallback_fill)
                .clamp(0.1, 1.0),
            safety_margin: env_or("REFRAME_SAFETY_MARGIN", defaults.safety_margin).max(0),
            render_preset: std::env::var("REFRAME_RENDER_PRESET")
                .unwrap_or(defaults.render_preset.clone()),
            render_crf: env_or("REFRAME_RENDER_CRF", defaults.render_crf),
            ..defaults
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
