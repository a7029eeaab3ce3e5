//! Background sweep of stale workspaces.
//!
//! Runs on its own timer, never on the request path. A directory is only
//! touched when its name parses as a workspace id and the embedded creation
//! time is older than the retention window.

use crate::domain::workspace::WorkspaceId;
use chrono::{DateTime, Duration, Utc};
use std::io;
use std::path::PathBuf;
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Janitor {
    root: PathBuf,
    retention: Duration,
}

impl Janitor {
    pub fn new(root: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            root: root.into(),
            retention,
        }
    }

    /// Removes every workspace created before `now - retention` and returns
    /// the removed paths. A missing root is not an error; a failing entry is
    /// logged and skipped.
    pub async fn sweep(&self, now: DateTime<Utc>) -> io::Result<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let Some(cutoff) = now.checked_sub_signed(self.retention) else {
            return Ok(Vec::new());
        };
        let mut removed = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "could not read workspace entry");
                    break;
                }
            };
            match entry.file_type().await {
                Ok(file_type) if file_type.is_dir() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!(entry = %entry.path().display(), error = %e, "could not stat workspace entry");
                    continue;
                }
            }
            let name = entry.file_name();
            let Some(created_at) = name
                .to_str()
                .and_then(WorkspaceId::parse)
                .and_then(|id| id.created_at())
            else {
                continue;
            };
            if created_at >= cutoff {
                continue;
            }

            let path = entry.path();
            match fs::remove_dir_all(&path).await {
                Ok(()) => {
                    info!(dir = %path.display(), "deleted stale workspace");
                    removed.push(path);
                }
                Err(e) => warn!(dir = %path.display(), error = %e, "could not delete workspace"),
            }
        }
        Ok(removed)
    }

    pub fn spawn(self, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep(Utc::now()).await {
                    warn!(root = %self.root.display(), error = %e, "workspace sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_workspace(root: &std::path::Path, created: DateTime<Utc>) -> PathBuf {
        let dir = root.join(WorkspaceId::generate(created).to_string());
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("output.mp4"), b"x").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_workspaces() {
        let root = tempdir().unwrap();
        let now = Utc::now();
        let stale = make_workspace(root.path(), now - Duration::minutes(11));
        let fresh = make_workspace(root.path(), now - Duration::minutes(1));
        let foreign = root.path().join("keep-me");
        std::fs::create_dir(&foreign).unwrap();
        let file = root.path().join("abc-1");
        std::fs::write(&file, b"not a dir").unwrap();

        let janitor = Janitor::new(root.path(), Duration::minutes(10));
        let removed = janitor.sweep(now).await.unwrap();

        assert_eq!(removed, vec![stale.clone()]);
        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(foreign.exists());
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_sweep_keeps_workspace_at_the_boundary() {
        let root = tempdir().unwrap();
        let now = Utc::now();
        let created = now - Duration::minutes(10);
        let dir = make_workspace(root.path(), created);

        let janitor = Janitor::new(root.path(), Duration::minutes(10));
        // Second granularity in the name: compare against the truncated time.
        let removed = janitor
            .sweep(WorkspaceId::generate(created).created_at().unwrap() + Duration::minutes(10))
            .await
            .unwrap();
        assert!(removed.is_empty());
        assert!(dir.exists());
    }

    #[tokio::test]
    async fn test_sweep_with_unbounded_retention_keeps_everything() {
        let root = tempdir().unwrap();
        let now = Utc::now();
        let stale = make_workspace(root.path(), now - Duration::days(365));

        let forever = Duration::try_milliseconds(i64::MAX).unwrap();
        let janitor = Janitor::new(root.path(), forever);
        assert!(janitor.sweep(now).await.unwrap().is_empty());
        assert!(stale.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sweep_skips_entries_it_cannot_remove() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempdir().unwrap();
        let now = Utc::now();
        let locked = make_workspace(root.path(), now - Duration::minutes(30));
        std::fs::create_dir(locked.join("inner")).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500)).unwrap();
        let stale = make_workspace(root.path(), now - Duration::minutes(20));

        let janitor = Janitor::new(root.path(), Duration::minutes(10));
        let removed = janitor.sweep(now).await;
        // Gone already when running as root.
        let _ = std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700));

        let removed = removed.unwrap();
        assert!(removed.contains(&stale));
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_sweep_missing_root_is_empty() {
        let root = tempdir().unwrap();
        let janitor = Janitor::new(root.path().join("never-created"), Duration::minutes(10));
        assert!(janitor.sweep(Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_janitor_sweeps_periodically() {
        let root = tempdir().unwrap();
        let stale = make_workspace(root.path(), Utc::now() - Duration::hours(1));

        let handle = Janitor::new(root.path(), Duration::minutes(10))
            .spawn(std::time::Duration::from_millis(10));
        for _ in 0..100 {
            if !stale.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(!stale.exists());
    }
}
