//! Synthesized lead-in clip: solid background, centered text, silent audio.

use super::escape::escape_title_text;
use super::{args, canonical_audio_args, path_arg, run_encoder, AUDIO_SAMPLE_RATE, FRAME_RATE};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::ports::command::CommandRunner;
use std::path::{Path, PathBuf};
use tracing::info;

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mkv", "avi", "mov"];

#[derive(Debug, Clone, PartialEq)]
pub struct TitleCard {
    pub text: String,
    /// Seconds
    pub duration: u32,
    /// `WIDTHxHEIGHT`
    pub resolution: String,
    pub font_size: u32,
    pub font_color: String,
    pub background: String,
    pub font_file: Option<PathBuf>,
}

impl TitleCard {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: 3,
            resolution: "1920x1080".to_string(),
            font_size: 64,
            font_color: "white".to_string(),
            background: "black".to_string(),
            font_file: None,
        }
    }

    pub fn with_font_file(mut self, font_file: Option<PathBuf>) -> Self {
        self.font_file = font_file;
        self
    }

    fn drawtext(&self) -> String {
        let mut filter = format!("drawtext=text={}", escape_title_text(&self.text));
        if let Some(font) = &self.font_file {
            filter.push_str(&format!(":fontfile={}", escape_title_text(&font.to_string_lossy())));
        }
        filter.push_str(&format!(
            ":fontcolor={}:fontsize={}:x=(w-text_w)/2:y=(h-text_h)/2",
            self.font_color, self.font_size
        ));
        filter
    }

    pub(crate) fn encoder_args(&self, output: &Path) -> Vec<String> {
        let duration = self.duration.to_string();
        let mut cmd = args(["-f", "lavfi", "-i"]);
        cmd.push(format!(
            "color=c={}:s={}:d={}",
            self.background, self.resolution, duration
        ));
        cmd.extend(args(["-f", "lavfi", "-t"]));
        cmd.push(duration.clone());
        cmd.push("-i".to_string());
        cmd.push(format!(
            "anullsrc=channel_layout=stereo:sample_rate={}",
            AUDIO_SAMPLE_RATE
        ));
        cmd.push("-vf".to_string());
        cmd.push(self.drawtext());
        cmd.extend(args(["-c:v", "libx264", "-r", FRAME_RATE]));
        cmd.extend(canonical_audio_args());
        cmd.push("-t".to_string());
        cmd.push(duration);
        cmd.push("-y".to_string());
        cmd.push(path_arg(output));
        cmd
    }
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
        .unwrap_or(false)
}

/// Renders `card` into `output`. The output extension is checked before the
/// encoder is started.
pub async fn generate(
    runner: &impl CommandRunner,
    card: &TitleCard,
    output: &Path,
) -> PipelineResult<()> {
    if !has_video_extension(output) {
        return Err(PipelineError::Validation(format!(
            "title card output {} must end in one of .{}",
            output.display(),
            VIDEO_EXTENSIONS.join(", .")
        )));
    }

    run_encoder(runner, "title card", card.encoder_args(output)).await?;
    info!(output = %output.display(), duration = card.duration, "title card rendered");
    Ok(())
}
