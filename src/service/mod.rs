//! Issuance and verification of certificates.

pub mod issue;
pub mod verify;

use log::warn;

use crate::error::Result;
use crate::record::{CertificateRecord, RecordStore};

pub use issue::{IssuanceService, IssueOutcome, IssueRequest, PublishPolicy, PublishStatus};
pub use verify::{VerificationService, VerifiedCertificate};

/// Looks up the record for `id`, taking the first match
pub(crate) async fn lookup(records: &dyn RecordStore, id: &str) -> Result<Option<CertificateRecord>> {
    let mut matches = records.query(id).await?;
    if matches.len() > 1 {
        warn!("{} records stored for '{}', using the first", matches.len(), id);
    }
    if matches.is_empty() {
        Ok(None)
    } else {
        Ok(Some(matches.swap_remove(0)))
    }
}
