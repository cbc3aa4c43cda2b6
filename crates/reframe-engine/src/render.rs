//! Transcoder invocations for previews and full renders.

use std::path::{Path, PathBuf};

use reframe_models::CropRect;

use crate::command::FfmpegCommand;
use crate::filters::{output_scale_filter, preview_filter};
use crate::planner::ReframePlan;
use crate::smart::ReframeConfig;

/// Unique preview image path inside `dir`.
pub fn preview_output_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref()
        .join(format!("preview_{}.jpg", uuid::Uuid::new_v4().simple()))
}

/// Single cropped frame at `at_secs`, scaled to `config.preview_width`.
///
/// The crop should have been through the validator first.
pub fn preview_command(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    crop: &CropRect,
    at_secs: f64,
    config: &ReframeConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .seek(at_secs.max(0.0))
        .video_filter(preview_filter(crop, config.preview_width))
        .single_frame()
}

/// Full render of a plan: crop (static or timeline), optional platform scale,
/// H.264 video and AAC audio.
pub fn render_command(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    plan: &ReframePlan,
    config: &ReframeConfig,
) -> FfmpegCommand {
    let filter = match plan.output_size {
        Some((width, height)) => format!("{},{}", plan.filter, output_scale_filter(width, height)),
        None => plan.filter.clone(),
    };

    FfmpegCommand::new(input, output)
        .video_filter(filter)
        .video_codec("libx264")
        .crf(config.render_crf)
        .preset(config.render_preset.clone())
        .audio_codec("aac")
        .audio_bitrate(config.audio_bitrate.clone())
        .output_arg("-movflags")
        .output_arg("+faststart")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{ReframeMode, ReframePlanner, ReframeRequest};
    use reframe_models::{FrameDimensions, VideoMetadata};

    fn plan(target: &str) -> ReframePlan {
        let request = ReframeRequest {
            video: VideoMetadata {
                width: 1280,
                height: 720,
                duration_seconds: 5.0,
            },
            target: target.to_string(),
            detections: Vec::new(),
            transcript: Vec::new(),
            mode: ReframeMode::Static,
            manual_crop: None,
        };
        ReframePlanner::default().plan(&request).unwrap()
    }

    #[test]
    fn test_preview_command() {
        let config = ReframeConfig::default();
        let crop = CropRect::new(316, 36, 648, 648, &FrameDimensions::new(1280, 720));
        let args = preview_command("in.mp4", "out.jpg", &crop, config.preview_at_secs, &config)
            .build_args();

        assert!(args.contains(&"2.000".to_string()));
        assert!(args.contains(&"crop=648:648:316:36,scale=400:-2".to_string()));
        assert!(args.contains(&"-frames:v".to_string()));
    }

    #[test]
    fn test_render_command_scales_platform_targets() {
        let config = ReframeConfig::default();
        let args = render_command("in.mp4", "out.mp4", &plan("instagram"), &config).build_args();

        assert!(args.contains(&"crop=648:648:316:36,scale=1080:1080,setsar=1".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"23".to_string()));
        assert!(args.contains(&"medium".to_string()));
        assert!(args.contains(&"128k".to_string()));
    }

    #[test]
    fn test_render_command_literal_ratio_keeps_crop_size() {
        let config = ReframeConfig::fast();
        let args = render_command("in.mp4", "out.mp4", &plan("4:5"), &config).build_args();

        assert!(!args.iter().any(|a| a.contains("scale=")));
        assert!(args.contains(&"ultrafast".to_string()));
    }

    #[test]
    fn test_preview_paths_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = preview_output_path(dir.path());
        let b = preview_output_path(dir.path());
        assert_ne!(a, b);
        assert!(a.starts_with(dir.path()));
        assert_eq!(a.extension().unwrap(), "jpg");
    }
}
