use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};

use super::{BlobStore, Visibility};
use crate::error::{CertError, Result};

/// Blob store writing each object to `{root}/{key}`.
///
/// Serving the directory publicly is left to whatever fronts it; the
/// visibility flag is only recorded in the log.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !plain {
            return Err(CertError::BlobStore(format!("invalid object key '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        visibility: Visibility,
        content_type: &str,
    ) -> Result<()> {
        let path = self.object_path(key)?;
        debug!("Storing {} ({}, {:?}) at {}", key, content_type, visibility, path.display());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CertError::BlobStore(format!("{}: {}", parent.display(), e)))?;
        }

        let size = bytes.len();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CertError::BlobStore(format!("{}: {}", path.display(), e)))?;

        info!("Published {} ({} bytes)", key, size);
        Ok(())
    }
}
