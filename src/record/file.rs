use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::{CertificateRecord, RecordStore};
use crate::error::{CertError, Result};

/// Record store backed by a single JSON document keyed by `id`.
///
/// Each `put` writes the whole document to a temporary file in the same
/// directory and renames it over the old one, so readers see either the
/// previous or the new document. The mutex only serializes file access
/// inside this process.
pub struct JsonFileRecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, CertificateRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(CertError::RecordStore(format!("{}: {}", self.path.display(), e))),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| CertError::RecordStore(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn query(&self, id: &str) -> Result<Vec<CertificateRecord>> {
        let _guard = self.lock.lock().await;
        let records = self.load().await?;
        Ok(records.get(id).cloned().into_iter().collect())
    }

    async fn put(&self, record: CertificateRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        debug!("Writing record '{}' to {}", record.id, self.path.display());
        records.insert(record.id.clone(), record);

        let pretty = serde_json::to_string_pretty(&records)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(parent_dir(&path))?;
            stage(&path, pretty.as_bytes())?
                .persist(&path)
                .map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CertError::RecordStore(format!("write task failed: {}", e)))?
        .map_err(|e| CertError::RecordStore(format!("{}: {}", self.path.display(), e)))
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Writes `content` to a temporary file beside `path`. Nothing at `path`
/// changes until the returned file is persisted.
fn stage(path: &Path, content: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new_in(parent_dir(path))?;
    file.write_all(content)?;
    file.as_file().sync_all()?;
    Ok(file)
}
