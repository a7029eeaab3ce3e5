use super::escape::{escape_timestamp_text, escape_title_text};
use super::probe::has_audio_stream;
use super::{canonical_audio_args, canonical_video_args, path_arg, run_encoder};
use crate::domain::error::PipelineResult;
use crate::ports::command::CommandRunner;
use std::path::{Path, PathBuf};
use tracing::info;

/// Styling of the timestamp caption burned into each clip.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    pub font_size: u32,
    pub font_color: String,
    pub font_file: Option<PathBuf>,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 24,
            font_color: "white".to_string(),
            font_file: None,
        }
    }
}

impl CaptionStyle {
    fn drawtext(&self, caption: &str) -> String {
        let mut filter = format!("drawtext=text={}", escape_timestamp_text(caption));
        if let Some(font) = &self.font_file {
            filter.push_str(&format!(":fontfile={}", escape_title_text(&font.to_string_lossy())));
        }
        filter.push_str(&format!(
            ":fontsize={}:fontcolor={}:x=(w-text_w)/2:y=(h-text_h)/2",
            self.font_size, self.font_color
        ));
        filter
    }
}

pub(crate) fn encoder_args(
    style: &CaptionStyle,
    caption: &str,
    input: &Path,
    output: &Path,
    with_audio: bool,
) -> Vec<String> {
    let mut cmd = vec!["-i".to_string(), path_arg(input)];
    cmd.push("-vf".to_string());
    cmd.push(style.drawtext(caption));
    cmd.extend(canonical_video_args());
    if with_audio {
        cmd.push("-af".to_string());
        cmd.push("aresample=async=1".to_string());
        cmd.extend(canonical_audio_args());
    }
    cmd.push("-y".to_string());
    cmd.push(path_arg(output));
    cmd
}

/// Burns `caption` into `input` and writes the normalized clip to `output`.
/// Clips without an audio track stay silent.
pub async fn preprocess(
    runner: &impl CommandRunner,
    style: &CaptionStyle,
    caption: &str,
    input: &Path,
    output: &Path,
) -> PipelineResult<()> {
    let with_audio = has_audio_stream(runner, input).await;
    run_encoder(
        runner,
        "clip preprocessing",
        encoder_args(style, caption, input, output, with_audio),
    )
    .await?;

    info!(input = %input.display(), output = %output.display(), with_audio, caption, "clip preprocessed");
    Ok(())
}
