//! Object storage for rendered certificates.

pub mod fs;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Access level of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    PublicRead,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        visibility: Visibility,
        content_type: &str,
    ) -> Result<()>;
}

/// Blob key of the certificate PDF for `id`
pub fn certificate_key(id: &str) -> String {
    format!("{}.pdf", id)
}

/// Publicly resolvable URL `{base}/{key}`
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Retrieval URL of the certificate for `id`. Identical for issuance and
/// verification.
pub fn certificate_url(base: &str, id: &str) -> String {
    public_url(base, &certificate_key(id))
}
