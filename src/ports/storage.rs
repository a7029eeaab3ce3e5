use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Copy an uploaded object identified by `key` into a local path
    async fn download(
        &self,
        key: &str,
        local_path: &Path,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
