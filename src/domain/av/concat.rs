//! Playlist construction and final assembly through the concat demuxer.

use super::{args, canonical_audio_args, canonical_video_args, path_arg, run_encoder};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::workspace::{Workspace, PLAYLIST_FILE};
use crate::ports::command::CommandRunner;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatMode {
    /// Title card first; output is cut to the shortest stream.
    WithTitleCard,
    /// Only preprocessed clips; no trimming.
    ClipsOnly,
}

/// Ordered segment names, relative to the workspace directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<String>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.entries.push(name.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `file '<name>'` directive per entry. Single quotes inside a name
    /// are closed, escaped and reopened as the demuxer expects.
    pub fn directives(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|name| format!("file '{}'", name.replace('\'', r"'\''")))
            .collect()
    }

    /// Writes the directive file into `workspace` after checking that every
    /// listed segment exists.
    pub async fn write(&self, workspace: &Workspace) -> PipelineResult<PathBuf> {
        if self.entries.is_empty() {
            return Err(PipelineError::Validation("playlist has no segments".to_string()));
        }
        for name in &self.entries {
            let path = workspace.path_of(name);
            let exists = tokio::fs::try_exists(&path)
                .await
                .map_err(|e| PipelineError::storage(format!("stat {}", path.display()), e))?;
            if !exists {
                return Err(PipelineError::storage(
                    format!("playlist segment {}", path.display()),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "segment missing"),
                ));
            }
        }
        workspace.write_list_file(PLAYLIST_FILE, &self.directives()).await
    }
}

pub(crate) fn encoder_args(playlist: &Path, output: &Path, mode: ConcatMode) -> Vec<String> {
    let mut cmd = args(["-f", "concat", "-safe", "0", "-i"]);
    cmd.push(path_arg(playlist));
    cmd.extend(canonical_video_args());
    cmd.extend(canonical_audio_args());
    if mode == ConcatMode::WithTitleCard {
        cmd.push("-shortest".to_string());
    }
    cmd.push("-y".to_string());
    cmd.push(path_arg(output));
    cmd
}

/// Re-encodes every playlist segment into a single output file.
pub async fn concatenate(
    runner: &impl CommandRunner,
    playlist: &Path,
    output: &Path,
    mode: ConcatMode,
) -> PipelineResult<()> {
    run_encoder(runner, "concatenation", encoder_args(playlist, output, mode)).await?;
    info!(output = %output.display(), ?mode, "segments concatenated");
    Ok(())
}
