use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CertificateRecord, RecordStore};
use crate::error::Result;

/// Process-local record store
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, CertificateRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn query(&self, id: &str) -> Result<Vec<CertificateRecord>> {
        Ok(self.records.read().await.get(id).cloned().into_iter().collect())
    }

    async fn put(&self, record: CertificateRecord) -> Result<()> {
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }
}
