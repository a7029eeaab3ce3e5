//! Audio/Video domain modules.
//!
//! Every segment that reaches the concat step is H.264 + AAC in MP4 so the
//! concat demuxer sees compatible inputs.

pub mod concat;
pub mod escape;
pub mod preprocess;
pub mod probe;
pub mod title_card;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::ports::command::{CommandRunner, Tool};
use std::path::Path;
use tracing::{debug, error};

pub(crate) const FRAME_RATE: &str = "30";
pub(crate) const AUDIO_SAMPLE_RATE: &str = "44100";
pub(crate) const AUDIO_BITRATE: &str = "192k";

pub(crate) fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `libx264 -preset veryfast -crf 23 -r 30`
pub(crate) fn canonical_video_args() -> Vec<String> {
    args([
        "-c:v", "libx264", "-preset", "veryfast", "-crf", "23", "-r", FRAME_RATE,
    ])
}

/// `aac -ar 44100 -b:a 192k`
pub(crate) fn canonical_audio_args() -> Vec<String> {
    args(["-c:a", "aac", "-ar", AUDIO_SAMPLE_RATE, "-b:a", AUDIO_BITRATE])
}

/// Runs the encoder and turns a spawn failure or non-zero exit into
/// `PipelineError::Encode` carrying the captured output.
pub(crate) async fn run_encoder(
    runner: &impl CommandRunner,
    step: &'static str,
    args: Vec<String>,
) -> PipelineResult<()> {
    debug!(step, args = ?args, "running {}", Tool::Encoder);

    let output = runner
        .run(Tool::Encoder, args)
        .await
        .map_err(|e| PipelineError::Encode {
            step,
            output: format!("could not run {}: {}", Tool::Encoder, e),
        })?;

    if !output.success {
        let captured = output.combined();
        error!(step, code = ?output.code, output = %captured, "{} exited with failure", Tool::Encoder);
        return Err(PipelineError::Encode {
            step,
            output: captured,
        });
    }
    Ok(())
}
