//! Crop rectangle consumed by the transcoder as literal crop coordinates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::FrameDimensions;

/// Crop rectangle in source pixels.
///
/// Produced rectangles have even `width`/`height` and lie inside the frame;
/// rectangles deserialized from callers (manual tweaks) carry no such promise
/// until they have been validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CropRect {
    /// Left edge x-coordinate
    pub x: i32,
    /// Top edge y-coordinate
    pub y: i32,
    /// Crop width
    pub width: i32,
    /// Crop height
    pub height: i32,
    #[serde(default, alias = "centerX")]
    pub center_x: f64,
    #[serde(default, alias = "centerY")]
    pub center_y: f64,
    /// `frame_width / width`
    #[serde(default, alias = "zoomFactor")]
    pub zoom_factor: f64,
}

impl CropRect {
    /// Create a crop rectangle, deriving center and zoom from the frame.
    pub fn new(x: i32, y: i32, width: i32, height: i32, frame: &FrameDimensions) -> Self {
        Self {
            x,
            y,
            width,
            height,
            center_x: x as f64 + width as f64 / 2.0,
            center_y: y as f64 + height as f64 / 2.0,
            zoom_factor: if width > 0 {
                frame.width as f64 / width as f64
            } else {
                0.0
            },
        }
    }

    /// Same size, new position. Center and zoom are recomputed.
    pub fn moved_to(&self, x: i32, y: i32, frame: &FrameDimensions) -> Self {
        Self::new(x, y, self.width, self.height, frame)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Width divided by height.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Fully contained in the frame with positive size.
    pub fn fits_within(&self, frame: &FrameDimensions) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && self.right() <= frame.width
            && self.bottom() <= frame.height
    }

    /// Even width and height.
    pub fn is_encoder_friendly(&self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields() {
        let frame = FrameDimensions::new(1280, 720);
        let crop = CropRect::new(316, 36, 648, 648, &frame);
        assert_eq!(crop.center_x, 640.0);
        assert_eq!(crop.center_y, 360.0);
        assert!((crop.zoom_factor - 1280.0 / 648.0).abs() < 1e-9);
        assert!(crop.fits_within(&frame));
        assert!(crop.is_encoder_friendly());
    }

    #[test]
    fn test_fits_within_rejects_overflow() {
        let frame = FrameDimensions::new(100, 100);
        assert!(!CropRect::new(60, 0, 50, 50, &frame).fits_within(&frame));
        assert!(!CropRect::new(-1, 0, 50, 50, &frame).fits_within(&frame));
    }

    #[test]
    fn test_deserialize_manual_crop() {
        let crop: CropRect =
            serde_json::from_str(r#"{"x":10,"y":20,"width":100,"height":200}"#).unwrap();
        assert_eq!(crop.right(), 110);
        assert_eq!(crop.bottom(), 220);
    }

    #[test]
    fn test_json_schema_lists_fields() {
        let schema = serde_json::to_string(&schemars::schema_for!(CropRect)).unwrap();
        for field in ["x", "width", "center_x", "zoom_factor"] {
            assert!(schema.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
    }
}
