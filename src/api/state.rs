//! Services shared across HTTP handlers

use std::sync::Arc;

use crate::blob::{BlobStore, FsBlobStore};
use crate::config::Config;
use crate::engine::{ChromiumEngine, DocumentEngine};
use crate::record::{JsonFileRecordStore, RecordStore};
use crate::service::{IssuanceService, VerificationService};
use crate::template::{CertificateAssets, PlaceholderReplacer, TemplateRenderer};

/// Application state. Clients are built once and injected into both
/// services.
pub struct AppState {
    pub issuance: IssuanceService,
    pub verification: VerificationService,
}

impl AppState {
    pub fn new(issuance: IssuanceService, verification: VerificationService) -> Self {
        Self {
            issuance,
            verification,
        }
    }

    /// Wires the file-backed stores and Chromium engine named in `config`
    pub fn from_config(config: &Config) -> Self {
        let records: Arc<dyn RecordStore> = Arc::new(JsonFileRecordStore::new(&config.records_path));
        let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.blob_dir));
        let renderer: Arc<dyn TemplateRenderer> = Arc::new(PlaceholderReplacer::new());
        let engine: Arc<dyn DocumentEngine> = Arc::new(
            ChromiumEngine::new(&config.chromium).with_args(config.chromium_args.clone()),
        );
        let assets = CertificateAssets::new(&config.template_path, &config.seal_path);

        let issuance = IssuanceService::new(
            records.clone(),
            blobs,
            renderer,
            engine,
            assets,
            config.public_base_url.clone(),
        )
        .with_policy(config.policy)
        .with_local_copy(config.local_copy.clone());

        let verification = VerificationService::new(records, config.public_base_url.clone());

        Self::new(issuance, verification)
    }
}
