use crate::ports::command::{CommandOutput, CommandRunner, Tool};
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Spawns the real ffmpeg / ffprobe binaries.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl ProcessRunner {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn program(&self, tool: Tool) -> &PathBuf {
        match tool {
            Tool::Encoder => &self.ffmpeg,
            Tool::Inspector => &self.ffprobe,
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, tool: Tool, args: Vec<String>) -> io::Result<CommandOutput> {
        let program = self.program(tool);
        debug!(program = %program.display(), ?args, "spawning");

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await?;

        let output = CommandOutput::from(output);
        debug!(program = %program.display(), code = ?output.code, "finished");
        Ok(output)
    }
}
