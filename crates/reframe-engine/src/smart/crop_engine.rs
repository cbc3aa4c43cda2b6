//! Crop rectangle computation for a subject envelope and a target ratio.
//!
//! The engine never fails once constructed: missing subjects degrade to a
//! centered fallback and every rectangle it returns is inside the frame,
//! has even dimensions and matches the target ratio to within a pixel.

use reframe_models::{CropRect, Detection, FrameDimensions, Orientation, TargetRatio};
use tracing::{debug, warn};

use super::aggregator::{aggregate, SubjectEnvelope};
use super::config::ReframeConfig;
use crate::error::{ensure_valid_frame, ReframeResult};

/// Where the crop is pinned vertically before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
enum VerticalAnchor {
    /// Crop center at this y
    Center(f64),
    /// Crop top edge at this y
    Top(f64),
}

/// Unclamped crop proposal in floating point pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    cx: f64,
    anchor: VerticalAnchor,
    width: f64,
    height: f64,
}

/// Crop engine for a single source frame size.
#[derive(Debug, Clone)]
pub struct CropEngine {
    config: ReframeConfig,
    frame: FrameDimensions,
}

impl CropEngine {
    /// Create a new crop engine.
    ///
    /// Fails with `InvalidFrameDimensions` when either side is zero or negative.
    pub fn new(config: ReframeConfig, frame: FrameDimensions) -> ReframeResult<Self> {
        ensure_valid_frame(&frame)?;
        Ok(Self { config, frame })
    }

    pub fn frame(&self) -> &FrameDimensions {
        &self.frame
    }

    pub fn config(&self) -> &ReframeConfig {
        &self.config
    }

    /// Aggregate detections and compute the crop around them.
    pub fn crop_for_detections(&self, detections: &[Detection], target: &TargetRatio) -> CropRect {
        let envelope = aggregate(detections, &self.frame);
        self.compute_crop(&envelope, target)
    }

    /// Compute the crop rectangle for an envelope.
    ///
    /// # Arguments
    /// * `envelope` - Subject envelope; invalid or zero-area envelopes take the fallback path
    /// * `target` - Target aspect ratio
    pub fn compute_crop(&self, envelope: &SubjectEnvelope, target: &TargetRatio) -> CropRect {
        let ratio = self.effective_ratio(target);

        if !envelope.is_usable() {
            warn!(
                target = %target,
                frame = %self.frame,
                "Invalid subject envelope, using centered fallback crop"
            );
            return self.fallback_for_ratio(ratio);
        }

        let orientation = Orientation::classify(ratio, self.config.square_tolerance);
        let placement = match orientation {
            Orientation::Vertical => self.plan_vertical(envelope, ratio),
            Orientation::Square | Orientation::Landscape => {
                self.plan_balanced(envelope, ratio, orientation)
            }
        };

        let crop = self.finalize(placement, ratio);
        debug!(
            orientation = %orientation,
            x = crop.x,
            y = crop.y,
            width = crop.width,
            height = crop.height,
            zoom = crop.zoom_factor,
            "Computed crop"
        );
        crop
    }

    /// Centered, detection-independent crop.
    pub fn fallback_crop(&self, target: &TargetRatio) -> CropRect {
        self.fallback_for_ratio(self.effective_ratio(target))
    }

    fn fallback_for_ratio(&self, ratio: f64) -> CropRect {
        let (fit_w, fit_h) = self.largest_fitting(ratio);
        let fill = self.config.fallback_fill.clamp(0.0, 1.0);
        let (cx, cy) = self.frame.center();

        self.finalize(
            Placement {
                cx,
                anchor: VerticalAnchor::Center(cy),
                width: fit_w * fill,
                height: fit_h * fill,
            },
            ratio,
        )
    }

    /// Vertical targets.
    ///
    /// The detection box is usually just a face, so the search window is
    /// extended upward for the top of the head and downward for the torso.
    /// While the padded width drives a height close to that window, the crop
    /// is sized by width (never shorter than the vertical search pad) and its
    /// center sits above the subject center to leave headroom. Wide subjects
    /// would need far more height than the window; there height leads instead
    /// and the crop is pinned to the estimated head line.
    fn plan_vertical(&self, envelope: &SubjectEnvelope, ratio: f64) -> Placement {
        let padding = self.config.padding_for(Orientation::Vertical);
        let content_w = envelope.width();
        let content_h = envelope.height();
        let (cx, cy) = envelope.center();

        let padded_w = content_w * padding.horizontal;
        let head_y = envelope.min_y - content_h * self.config.head_extension;
        let lower_body_y = envelope.max_y + content_h * self.config.body_extension;
        let window_h = (lower_body_y - head_y).max(content_h * padding.vertical);
        let width_driven_h = padded_w / ratio;

        if width_driven_h <= window_h * self.config.window_tolerance {
            let height = width_driven_h.max(content_h * padding.vertical);
            debug!(width_driven_h, window_h, height, "Vertical crop sized by width");
            Placement {
                cx,
                anchor: VerticalAnchor::Center(cy - content_h * self.config.headroom_bias),
                width: height * ratio,
                height,
            }
        } else {
            let max_h = self.frame.height as f64 * self.config.max_height_fraction;
            let height = width_driven_h.min(max_h);
            debug!(width_driven_h, window_h, max_h, "Vertical crop sized by height");
            Placement {
                cx,
                anchor: VerticalAnchor::Top(head_y),
                width: height * ratio,
                height,
            }
        }
    }

    /// Square and landscape targets: grow the padded box along its limiting
    /// dimension until it matches the ratio.
    fn plan_balanced(
        &self,
        envelope: &SubjectEnvelope,
        ratio: f64,
        orientation: Orientation,
    ) -> Placement {
        let padding = self.config.padding_for(orientation);
        let (cx, cy) = envelope.center();

        let mut width = envelope.width() * padding.horizontal;
        let mut height = envelope.height() * padding.vertical;

        if width / height > ratio {
            height = width / ratio;
        } else {
            width = height * ratio;
        }

        Placement {
            cx,
            anchor: VerticalAnchor::Center(cy),
            width,
            height,
        }
    }

    /// Clamp to the frame, snap to even pixels and derive center and zoom.
    fn finalize(&self, placement: Placement, ratio: f64) -> CropRect {
        let fw = self.frame.width as f64;
        let fh = self.frame.height as f64;

        // Never larger than the frame; shrinking keeps the ratio.
        let mut width = placement.width;
        let mut height = placement.height;
        if width > fw {
            width = fw;
            height = width / ratio;
        }
        if height > fh {
            height = fh;
            width = height * ratio;
        }

        let (w, h) = even_size_for_ratio(height, ratio, self.frame.width, self.frame.height);

        let x_float = placement.cx - w as f64 / 2.0;
        let y_float = match placement.anchor {
            VerticalAnchor::Center(cy) => cy - h as f64 / 2.0,
            VerticalAnchor::Top(top) => top,
        };

        // Shift, never resize, to bring the rectangle on screen.
        let x = round_even(x_float).clamp(0, floor_even(self.frame.width - w).max(0));
        let y = round_even(y_float).clamp(0, floor_even(self.frame.height - h).max(0));

        CropRect::new(x, y, w, h, &self.frame)
    }

    /// Largest rectangle of the given ratio that fits the frame.
    fn largest_fitting(&self, ratio: f64) -> (f64, f64) {
        let fw = self.frame.width as f64;
        let fh = self.frame.height as f64;
        if self.frame.aspect() > ratio {
            (fh * ratio, fh)
        } else {
            (fw, fw / ratio)
        }
    }

    fn effective_ratio(&self, target: &TargetRatio) -> f64 {
        if target.is_valid() {
            target.ratio()
        } else {
            warn!(target = %target, "Degenerate target ratio, using source aspect");
            self.frame.aspect()
        }
    }
}

/// Round to the nearest even integer.
#[inline]
pub(crate) fn round_even(value: f64) -> i32 {
    ((value / 2.0).round() * 2.0) as i32
}

/// Largest even integer not above `value`.
#[inline]
pub(crate) fn floor_even(value: i32) -> i32 {
    value - value.rem_euclid(2)
}

/// Even (width, height) close to `height` and `ratio` that fit inside the frame.
///
/// Height is snapped down to even and width derived from it, so any rounding
/// lands on the width. When the height is not the smaller side the width error
/// must stay strictly below one pixel, otherwise the height is stepped down.
fn even_size_for_ratio(height: f64, ratio: f64, max_w: i32, max_h: i32) -> (i32, i32) {
    let max_w_even = floor_even(max_w);
    let max_h_even = floor_even(max_h);
    if max_w_even < 2 || max_h_even < 2 {
        return (max_w.max(1), max_h.max(1));
    }

    let mut h = floor_even((height + 1e-6).floor() as i32).clamp(2, max_h_even);
    while h >= 2 {
        let exact_w = h as f64 * ratio;
        let w = round_even(exact_w).max(2);
        let error = (w as f64 - exact_w).abs();
        if w <= max_w_even && (w < h || error < 1.0 - 1e-9) {
            return (w, h);
        }
        h -= 2;
    }

    (2, 2)
}
