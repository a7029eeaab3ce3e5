//! Per-request scratch directories.
//!
//! A workspace is named `{token}-{unix_seconds}`. The pipeline only ever
//! creates workspaces; removing them is the janitor's job.

use super::error::{PipelineError, PipelineResult};
use chrono::{DateTime, TimeZone, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::fs;
use tracing::debug;

pub const TITLE_CARD_FILE: &str = "text_video.mp4";
pub const PLAYLIST_FILE: &str = "concat_list.txt";
pub const OUTPUT_FILE: &str = "output.mp4";

const TOKEN_LEN: usize = 10;

pub fn original_file(index: usize, extension: &str) -> String {
    format!("original_{}.{}", index, extension)
}

pub fn processed_file(index: usize) -> String {
    format!("processed_{}.mp4", index)
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z0-9]+)-(\d+)$").expect("workspace id pattern"))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceId {
    token: String,
    created_at: i64,
}

impl WorkspaceId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        Self {
            token,
            created_at: now.timestamp(),
        }
    }

    /// Recovers an id from a directory name. Returns `None` for anything
    /// that is not `{alphanumeric}-{digits}`.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = id_pattern().captures(name)?;
        let created_at = caps.get(2)?.as_str().parse().ok()?;
        Some(Self {
            token: caps.get(1)?.as_str().to_string(),
            created_at,
        })
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.token, self.created_at)
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    id: WorkspaceId,
    dir: PathBuf,
}

impl Workspace {
    /// Allocates a fresh directory under `root`, creating `root` if needed.
    /// The leaf is created exclusively so a name collision is an error.
    pub async fn create(root: &Path) -> PipelineResult<Self> {
        fs::create_dir_all(root)
            .await
            .map_err(|e| PipelineError::storage(format!("create {}", root.display()), e))?;

        let id = WorkspaceId::generate(Utc::now());
        let dir = root.join(id.to_string());
        fs::create_dir(&dir)
            .await
            .map_err(|e| PipelineError::storage(format!("create {}", dir.display()), e))?;

        debug!(workspace = %id, dir = %dir.display(), "workspace created");
        Ok(Self { id, dir })
    }

    pub fn id(&self) -> &WorkspaceId {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }

    /// Path as reported to callers: relative to the workspace root.
    pub fn relative(&self, name: &str) -> String {
        format!("{}/{}", self.id, name)
    }

    /// Writes `entries` one per line into `name` and returns its path.
    pub async fn write_list_file(&self, name: &str, entries: &[String]) -> PipelineResult<PathBuf> {
        let path = self.path_of(name);
        let mut body = String::new();
        for entry in entries {
            body.push_str(entry);
            body.push('\n');
        }
        fs::write(&path, body)
            .await
            .map_err(|e| PipelineError::storage(format!("write {}", path.display()), e))?;
        Ok(path)
    }
}
