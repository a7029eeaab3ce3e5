//! Configuration loaded from the environment.

use chrono::TimeDelta;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for the single-server deployment.
#[derive(Clone, Debug)]
pub struct LocalConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Directory under which per-request workspaces are created
    pub workspace_root: PathBuf,
    /// ffmpeg binary
    pub ffmpeg_path: PathBuf,
    /// ffprobe binary
    pub ffprobe_path: PathBuf,
    /// Font used for title cards and captions; ffmpeg's default when unset
    pub font_file: Option<PathBuf>,
    /// Workspaces older than this are deleted by the janitor
    pub retention_minutes: i64,
    /// Seconds between two janitor sweeps
    pub sweep_interval_secs: u64,
    /// Largest accepted size of a single uploaded video
    pub max_upload_bytes: u64,
}

const DEFAULT_RETENTION_MINUTES: i64 = 10;

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl LocalConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            workspace_root: env::var("WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("splice")),
            ffmpeg_path: env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffmpeg")),
            ffprobe_path: env::var("FFPROBE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffprobe")),
            font_file: env::var("FONT_FILE")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            retention_minutes: parsed_or("RETENTION_MINUTES", DEFAULT_RETENTION_MINUTES),
            sweep_interval_secs: parsed_or("SWEEP_INTERVAL_SECS", 60),
            max_upload_bytes: parsed_or("MAX_UPLOAD_BYTES", 30 * 1024 * 1024),
        }
    }

    /// Workspace retention. Non-positive or unrepresentable values fall back
    /// to the default.
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.retention_minutes)
            .filter(|retention| *retention > TimeDelta::zero())
            .unwrap_or_else(|| TimeDelta::minutes(DEFAULT_RETENTION_MINUTES))
    }
}
