//! FFmpeg filter strings for crops and crop timelines.
//!
//! This is the only place that knows the transcoder's expression syntax.

use reframe_models::CropRect;

use crate::smart::CropTimeline;

/// One of the four crop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropField {
    X,
    Y,
    Width,
    Height,
}

impl CropField {
    pub const ALL: [CropField; 4] = [CropField::Width, CropField::Height, CropField::X, CropField::Y];

    /// Option name in the `crop` filter.
    pub fn key(&self) -> &'static str {
        match self {
            CropField::X => "x",
            CropField::Y => "y",
            CropField::Width => "w",
            CropField::Height => "h",
        }
    }

    pub fn value(&self, crop: &CropRect) -> i32 {
        match self {
            CropField::X => crop.x,
            CropField::Y => crop.y,
            CropField::Width => crop.width,
            CropField::Height => crop.height,
        }
    }
}

/// Literal crop: `crop=w:h:x:y`.
pub fn crop_filter(crop: &CropRect) -> String {
    format!("crop={}:{}:{}:{}", crop.width, crop.height, crop.x, crop.y)
}

/// Single-frame preview: crop, then scale to `width` keeping an even height.
pub fn preview_filter(crop: &CropRect, width: u32) -> String {
    format!("{},scale={}:-2", crop_filter(crop), width)
}

/// Scale to the platform output size.
pub fn output_scale_filter(width: u32, height: u32) -> String {
    format!("scale={}:{},setsar=1", width, height)
}

/// Chained conditional for one field.
///
/// Each entry becomes `if(gte(t,s)*lt(t,e),v,<rest>)` in entry order, so the
/// first matching entry wins; the chain ends with the fallback value. Commas
/// are left unescaped.
pub fn field_expression(timeline: &CropTimeline, field: CropField) -> String {
    let entries = timeline.entries();
    let mut expr = String::new();

    for entry in entries {
        expr.push_str(&format!(
            "if(gte(t,{:.3})*lt(t,{:.3}),{},",
            entry.interval.start,
            entry.interval.end,
            field.value(&entry.crop)
        ));
    }
    expr.push_str(&field.value(timeline.fallback()).to_string());
    expr.push_str(&")".repeat(entries.len()));
    expr
}

/// Escape commas so an expression survives filter graph parsing.
pub fn escape_commas(expr: &str) -> String {
    expr.replace(',', "\\,")
}

/// Time-varying crop: `crop=w=<expr>:h=<expr>:x=<expr>:y=<expr>`.
///
/// FFmpeg evaluates `w`/`h` once at init and `x`/`y` per frame. Timelines from
/// [`CropTimeline::with_common_size`] share one size, which is then written as
/// a literal; otherwise every field gets its conditional chain.
pub fn timeline_crop_filter(timeline: &CropTimeline) -> String {
    let common = timeline.common_size();
    let params: Vec<String> = CropField::ALL
        .iter()
        .map(|field| {
            let value = match (field, common) {
                (CropField::Width, Some((w, _))) => w.to_string(),
                (CropField::Height, Some((_, h))) => h.to_string(),
                _ => escape_commas(&field_expression(timeline, *field)),
            };
            format!("{}={}", field.key(), value)
        })
        .collect();
    format!("crop={}", params.join(":"))
}
