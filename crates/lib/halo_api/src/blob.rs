//! Storage for uploaded images.
//!
//! Handlers only see [`BlobStore`]; the shipped [`LocalBlobStore`] writes to a
//! directory the router also serves under `/uploads`.

use std::path::PathBuf;

use async_trait::async_trait;
use halo_core::ids;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob io: {0}")]
    Io(#[from] std::io::Error),
}

/// Where uploaded bytes end up. Returns the public URL of the stored object.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bytes: &[u8], extension: &str) -> Result<String, BlobError>;
}

/// Writes blobs as files under `root`, addressed by `base_url/<name>`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bytes: &[u8], extension: &str) -> Result<String, BlobError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let name = ids::object_name(extension);
        let path = self.root.join(&name);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!(path = %path.display(), size = bytes.len(), "blob stored");
        Ok(format!("{}/{name}", self.base_url))
    }
}
