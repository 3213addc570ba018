use std::sync::Arc;

use log::debug;

use super::issue::validate_id;
use super::lookup;
use crate::blob::certificate_url;
use crate::error::Result;
use crate::record::{CertificateRecord, RecordStore};

/// A certificate found by verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCertificate {
    pub record: CertificateRecord,
    pub url: String,
}

/// Read-only lookup of issued certificates
pub struct VerificationService {
    records: Arc<dyn RecordStore>,
    public_base_url: String,
}

impl VerificationService {
    pub fn new(records: Arc<dyn RecordStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            records,
            public_base_url: public_base_url.into(),
        }
    }

    /// Returns the record and URL for `id`, or `None` if never issued
    pub async fn verify(&self, id: &str) -> Result<Option<VerifiedCertificate>> {
        validate_id(id)?;

        let found = lookup(self.records.as_ref(), id).await?;
        debug!("Verification of '{}': {}", id, if found.is_some() { "found" } else { "absent" });

        Ok(found.map(|record| VerifiedCertificate {
            url: certificate_url(&self.public_base_url, &record.id),
            record,
        }))
    }
}
