//! Duration and audio-presence queries via the media inspector.

use crate::domain::error::{PipelineError, PipelineResult};
use crate::ports::command::{CommandRunner, Tool};
use super::{args, path_arg};
use std::path::Path;
use tracing::{debug, warn};

/// Longest duration accepted from the inspector: one year.
pub const MAX_DURATION_SECS: f64 = 365.0 * 24.0 * 3600.0;

/// Container-level duration of `path` in seconds.
pub async fn duration(runner: &impl CommandRunner, path: &Path) -> PipelineResult<f64> {
    let mut args = args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0", "-i"]);
    args.push(path_arg(path));

    let probe_error = |reason: String| PipelineError::Probe {
        path: path.display().to_string(),
        reason,
    };

    let output = runner
        .run(Tool::Inspector, args)
        .await
        .map_err(|e| probe_error(format!("could not run {}: {}", Tool::Inspector, e)))?;

    if !output.success {
        return Err(probe_error(output.combined()));
    }

    let first = output.stdout.lines().next().unwrap_or("").trim();
    let seconds: f64 = first
        .parse()
        .map_err(|_| probe_error(format!("unparseable duration {:?}", first)))?;
    if !seconds.is_finite() {
        return Err(probe_error(format!("unparseable duration {:?}", first)));
    }
    if seconds > MAX_DURATION_SECS {
        return Err(probe_error(format!("implausible duration {} s", seconds)));
    }

    debug!(path = %path.display(), seconds, "probed duration");
    Ok(seconds)
}

/// Whether `path` carries at least one audio stream. Inspector failures are
/// reported as "no audio".
pub async fn has_audio_stream(runner: &impl CommandRunner, path: &Path) -> bool {
    let mut args = args(["-loglevel", "error", "-show_streams", "-select_streams", "a", "-i"]);
    args.push(path_arg(path));

    match runner.run(Tool::Inspector, args).await {
        Ok(output) => output.success && !output.stdout.trim().is_empty(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "audio probe could not run, assuming silent clip");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::command::{CommandOutput, MockCommandRunner};
    use std::io;

    fn runner_returning(output: io::Result<CommandOutput>) -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        let mut slot = Some(output);
        runner
            .expect_run()
            .times(1)
            .returning(move |_, _| slot.take().expect("single call"));
        runner
    }

    #[tokio::test]
    async fn test_duration_parses_first_line() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|tool, args| {
                *tool == Tool::Inspector
                    && args.contains(&"format=duration".to_string())
                    && args.last().map(String::as_str) == Some("/tmp/clip.mp4")
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("3.200000\n")));

        let seconds = duration(&runner, Path::new("/tmp/clip.mp4")).await.unwrap();
        assert!((seconds - 3.2).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_duration_fails_on_nonzero_exit() {
        let runner = runner_returning(Ok(CommandOutput::failed(1, "moov atom not found")));
        let err = duration(&runner, Path::new("broken.mp4")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Probe { .. }));
        assert!(err.to_string().contains("moov atom not found"));
    }

    #[tokio::test]
    async fn test_duration_fails_on_unparseable_output() {
        for stdout in ["", "N/A\n", "inf\n"] {
            let runner = runner_returning(Ok(CommandOutput::ok(stdout)));
            let err = duration(&runner, Path::new("clip.mp4")).await.unwrap_err();
            assert!(matches!(err, PipelineError::Probe { .. }), "{stdout:?}");
        }
    }

    #[tokio::test]
    async fn test_duration_rejects_implausible_values() {
        for stdout in ["100000000000000000.000000\n", "31536001\n"] {
            let runner = runner_returning(Ok(CommandOutput::ok(stdout)));
            let err = duration(&runner, Path::new("crafted.mp4")).await.unwrap_err();
            assert!(matches!(err, PipelineError::Probe { .. }), "{stdout:?}");
        }

        let runner = runner_returning(Ok(CommandOutput::ok("31536000.0\n")));
        assert_eq!(duration(&runner, Path::new("long.mp4")).await.unwrap(), MAX_DURATION_SECS);
    }

    #[tokio::test]
    async fn test_duration_fails_when_inspector_missing() {
        let runner = runner_returning(Err(io::Error::new(io::ErrorKind::NotFound, "no ffprobe")));
        let err = duration(&runner, Path::new("clip.mp4")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Probe { .. }));
    }

    #[tokio::test]
    async fn test_has_audio_stream_reports_presence() {
        let runner = runner_returning(Ok(CommandOutput::ok(
            "[STREAM]\nindex=1\ncodec_type=audio\n[/STREAM]\n",
        )));
        assert!(has_audio_stream(&runner, Path::new("clip.mp4")).await);
    }

    #[tokio::test]
    async fn test_has_audio_stream_treats_failures_as_silent() {
        let cases = vec![
            Ok(CommandOutput::ok("")),
            Ok(CommandOutput::ok("  \n")),
            Ok(CommandOutput::failed(1, "Invalid data found")),
            Err(io::Error::new(io::ErrorKind::NotFound, "no ffprobe")),
        ];
        for case in cases {
            let runner = runner_returning(case);
            assert!(!has_audio_stream(&runner, Path::new("clip.mp4")).await);
        }
    }
}
