//! Certificate records and the store that keeps them.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use file::JsonFileRecordStore;
pub use memory::MemoryRecordStore;

/// Date format printed on certificates
pub const CERTIFICATE_DATE_FORMAT: &str = "%d/%m/%Y";

/// One issued certificate. Created once per `id`, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: String,
    pub name: String,
    pub grade: String,

    /// Moment the record was first created
    #[serde(rename = "created_at", alias = "issuedAt")]
    pub issued_at: DateTime<Utc>,
}

impl CertificateRecord {
    pub fn new(id: String, name: String, grade: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            grade,
            issued_at,
        }
    }
}

/// Key-value persistence for certificate records.
///
/// `put` is an unconditional write. Callers that need create-if-absent
/// semantics query first; the sequence is not atomic.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records stored under `id` (at most one is expected)
    async fn query(&self, id: &str) -> Result<Vec<CertificateRecord>>;

    async fn put(&self, record: CertificateRecord) -> Result<()>;
}

/// The date printed on a certificate: original issuance if a record
/// already existed, otherwise `now`.
pub fn effective_date(existing: Option<&CertificateRecord>, now: DateTime<Utc>) -> DateTime<Utc> {
    existing.map(|record| record.issued_at).unwrap_or(now)
}

/// Formats a date as DD/MM/YYYY
pub fn format_certificate_date(date: DateTime<Utc>) -> String {
    date.format(CERTIFICATE_DATE_FORMAT).to_string()
}
