//! Target aspect ratios and the social platform presets that select them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default tolerance for treating a ratio as square.
pub const SQUARE_TOLERANCE: f64 = 0.01;

/// Orientation class of a target ratio. Drives padding heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Taller than wide (9:16, 4:5)
    Vertical,
    /// Roughly 1:1
    Square,
    /// Wider than tall (16:9)
    Landscape,
}

impl Orientation {
    /// Classify a width/height ratio.
    pub fn classify(ratio: f64, square_tolerance: f64) -> Self {
        if (ratio - 1.0).abs() <= square_tolerance {
            Orientation::Square
        } else if ratio < 1.0 {
            Orientation::Vertical
        } else {
            Orientation::Landscape
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Square => "square",
            Orientation::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output aspect ratio requested for a reframe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TargetRatio {
    #[serde(alias = "ratioWidth", alias = "width")]
    pub ratio_width: u32,
    #[serde(alias = "ratioHeight", alias = "height")]
    pub ratio_height: u32,
    #[serde(default)]
    pub name: String,
}

impl TargetRatio {
    /// Create a new target ratio.
    pub fn new(ratio_width: u32, ratio_height: u32, name: impl Into<String>) -> Self {
        Self {
            ratio_width,
            ratio_height,
            name: name.into(),
        }
    }

    /// Returns width/height as float.
    pub fn ratio(&self) -> f64 {
        self.ratio_width as f64 / self.ratio_height as f64
    }

    /// Orientation using the default square tolerance.
    pub fn orientation(&self) -> Orientation {
        Orientation::classify(self.ratio(), SQUARE_TOLERANCE)
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation() == Orientation::Vertical
    }

    pub fn is_square(&self) -> bool {
        self.orientation() == Orientation::Square
    }

    /// Both components must be non-zero.
    pub fn is_valid(&self) -> bool {
        self.ratio_width > 0 && self.ratio_height > 0
    }

    /// Resolve either a platform id (`"tiktok"`) or a literal ratio (`"9:16"`).
    pub fn resolve(target: &str) -> Result<Self, TargetRatioParseError> {
        if let Ok(platform) = target.parse::<Platform>() {
            return Ok(platform.target());
        }
        target.parse()
    }
}

impl fmt::Display for TargetRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ratio_width, self.ratio_height)
    }
}

impl FromStr for TargetRatio {
    type Err = TargetRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| TargetRatioParseError::InvalidFormat(s.to_string()))?;

        let ratio_width: u32 = w
            .trim()
            .parse()
            .map_err(|_| TargetRatioParseError::InvalidNumber(w.to_string()))?;
        let ratio_height: u32 = h
            .trim()
            .parse()
            .map_err(|_| TargetRatioParseError::InvalidNumber(h.to_string()))?;

        if ratio_width == 0 || ratio_height == 0 {
            return Err(TargetRatioParseError::ZeroValue);
        }

        Ok(TargetRatio::new(ratio_width, ratio_height, s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetRatioParseError {
    #[error("Invalid target ratio format: {0}, expected 'W:H' or a platform id")]
    InvalidFormat(String),
    #[error("Invalid number in target ratio: {0}")]
    InvalidNumber(String),
    #[error("Target ratio cannot have zero values")]
    ZeroValue,
}

/// Social platform presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// TikTok / YouTube Shorts / Reels (9:16)
    TikTok,
    /// Instagram feed square (1:1)
    Instagram,
    /// YouTube landscape (16:9)
    YouTube,
    /// Instagram/Facebook stories (9:16)
    Story,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[
        Platform::TikTok,
        Platform::Instagram,
        Platform::YouTube,
        Platform::Story,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::Story => "story",
        }
    }

    /// Human-readable platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::TikTok => "TikTok/Shorts",
            Platform::Instagram => "Instagram Square",
            Platform::YouTube => "YouTube Landscape",
            Platform::Story => "Instagram/Facebook Story",
        }
    }

    /// Target ratio for this platform.
    pub fn target(&self) -> TargetRatio {
        let (w, h) = match self {
            Platform::TikTok | Platform::Story => (9, 16),
            Platform::Instagram => (1, 1),
            Platform::YouTube => (16, 9),
        };
        TargetRatio::new(w, h, self.display_name())
    }

    /// Delivery resolution (width, height) for the platform.
    pub fn output_size(&self) -> (u32, u32) {
        match self {
            Platform::TikTok | Platform::Story => (1080, 1920),
            Platform::Instagram => (1080, 1080),
            Platform::YouTube => (1920, 1080),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiktok" | "shorts" | "reels" => Ok(Platform::TikTok),
            "instagram" => Ok(Platform::Instagram),
            "youtube" => Ok(Platform::YouTube),
            "story" => Ok(Platform::Story),
            _ => Err(PlatformParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown platform: {0}")]
pub struct PlatformParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_classification() {
        assert_eq!(Platform::TikTok.target().orientation(), Orientation::Vertical);
        assert_eq!(Platform::Instagram.target().orientation(), Orientation::Square);
        assert_eq!(Platform::YouTube.target().orientation(), Orientation::Landscape);
        assert!(TargetRatio::new(4, 5, "portrait").is_vertical());
        assert!(TargetRatio::new(1000, 1005, "almost").is_square());
    }

    #[test]
    fn test_target_ratio_parse() {
        let target: TargetRatio = "9:16".parse().unwrap();
        assert_eq!(target.ratio_width, 9);
        assert_eq!(target.ratio_height, 16);
        assert!("16x9".parse::<TargetRatio>().is_err());
        assert!(matches!(
            "0:9".parse::<TargetRatio>(),
            Err(TargetRatioParseError::ZeroValue)
        ));
    }

    #[test]
    fn test_resolve_platform_or_ratio() {
        let tiktok = TargetRatio::resolve("TikTok").unwrap();
        assert_eq!(tiktok.to_string(), "9:16");
        assert_eq!(tiktok.name, "TikTok/Shorts");

        let custom = TargetRatio::resolve("4:5").unwrap();
        assert_eq!(custom.to_string(), "4:5");

        assert!(TargetRatio::resolve("myspace").is_err());
    }

    #[test]
    fn test_platform_roundtrip_ids() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), *platform);
        }
    }
}
