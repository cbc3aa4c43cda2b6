//! Bounds validation for externally supplied crops.
//!
//! Engine output is already in bounds; this is for manual tweaks and other
//! caller-provided rectangles before a preview render. It only ever moves a
//! rectangle, it never resizes one.

use reframe_models::{CropRect, FrameDimensions};
use tracing::warn;

use crate::error::{ensure_valid_frame, ReframeError, ReframeResult};

/// Shift `crop` so it keeps `margin` pixels from every frame edge.
///
/// Fails with `OutOfBounds` only when the width or height alone exceeds the
/// frame. When the rectangle fits the frame but not inside the margins, the
/// far-edge correction wins and the near edge is clamped to 0.
pub fn validate_crop(
    crop: CropRect,
    frame: &FrameDimensions,
    margin: i32,
) -> ReframeResult<CropRect> {
    ensure_valid_frame(frame)?;

    if crop.width <= 0 || crop.height <= 0 {
        return Err(ReframeError::invalid_request(format!(
            "crop size must be positive, got {}x{}",
            crop.width, crop.height
        )));
    }

    if crop.width > frame.width || crop.height > frame.height {
        return Err(ReframeError::OutOfBounds {
            width: crop.width,
            height: crop.height,
            frame_width: frame.width,
            frame_height: frame.height,
        });
    }

    let margin = margin.max(0);
    let x = correct_axis("x", crop.x, crop.width, frame.width, margin);
    let y = correct_axis("y", crop.y, crop.height, frame.height, margin);

    if x == crop.x && y == crop.y {
        return Ok(crop);
    }

    let corrected = crop.moved_to(x, y, frame);
    warn!(
        before_x = crop.x,
        before_y = crop.y,
        after_x = corrected.x,
        after_y = corrected.y,
        width = crop.width,
        height = crop.height,
        margin,
        "Crop auto-corrected into frame"
    );
    Ok(corrected)
}

/// Correct one axis. Caller guarantees `size <= limit`.
///
/// Works in `i64` so positions anywhere in the `i32` range cannot overflow;
/// the result always lies in `0..=limit - size`.
fn correct_axis(axis: &'static str, pos: i32, size: i32, limit: i32, margin: i32) -> i32 {
    let size = i64::from(size);
    let margin = i64::from(margin);
    let mut corrected = i64::from(pos);

    if corrected < margin {
        warn!(axis, before = corrected, after = margin, "Near edge inside safety margin");
        corrected = margin;
    }

    let far_limit = i64::from(limit) - margin;
    if corrected + size > far_limit {
        let shifted = far_limit - size;
        warn!(axis, before = corrected, after = shifted, "Far edge inside safety margin");
        corrected = shifted;
    }

    // 0 <= corrected <= limit - size, so it fits back into i32
    corrected.clamp(0, i64::from(limit) - size) as i32
}
