use crate::ports::storage::StoragePort;
use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

/// Uploads live on the same machine as the workspaces, so staging is a copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsAdapter;

impl FsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoragePort for FsAdapter {
    async fn download(
        &self,
        key: &str,
        local_path: &Path,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        // In local mode the key is the path the request layer wrote the upload to.
        let key_path = Path::new(key);
        if key_path != local_path {
            if let Some(parent) = local_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(key_path, local_path).await?;
        }
        Ok(())
    }
}
