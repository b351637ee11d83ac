//! Blob storage for uploaded files

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Where uploaded files live. Paths are relative to the store root and use `/`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `dir` with a fresh unique name and return its path
    async fn put(&self, dir: &str, extension: &str, bytes: Vec<u8>) -> AppResult<String>;

    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Remove a blob; a blob that is already gone is not an error
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// URL under which `path` is served
    fn public_url(&self, path: &str) -> String;
}

/// Blob store on the local filesystem
pub struct LocalBlobStore {
    root: PathBuf,
    public_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a relative blob path, refusing anything that leaves the root
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || !relative.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::Storage(format!("Invalid blob path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, dir: &str, extension: &str, bytes: Vec<u8>) -> AppResult<String> {
        let dir = dir.trim_matches('/');
        let directory = self.resolve(dir)?;
        tokio::fs::create_dir_all(&directory).await?;

        let path = format!("{}/{}.{}", dir, Uuid::new_v4(), extension);
        tokio::fs::write(self.resolve(&path)?, bytes).await?;

        tracing::debug!("Stored blob {}", path);
        Ok(path)
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(tokio::fs::try_exists(self.resolve(path)?).await?)
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        match tokio::fs::remove_file(self.resolve(path)?).await {
            Ok(()) => {
                tracing::debug!("Deleted blob {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
