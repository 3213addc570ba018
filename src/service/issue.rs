use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::lookup;
use crate::blob::{certificate_key, certificate_url, BlobStore, Visibility, PDF_CONTENT_TYPE};
use crate::engine::{DocumentEngine, EngineInstance, PdfOptions};
use crate::error::{CertError, Result};
use crate::record::{effective_date, format_certificate_date, CertificateRecord, RecordStore};
use crate::template::{CertificateAssets, TemplateData, TemplateRenderer};

/// Body of an issuance request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub id: String,
    pub name: String,
    pub grade: String,
}

impl IssueRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grade: grade.into(),
        }
    }

    /// Parses and validates a JSON request body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| CertError::Validation(format!("invalid request body: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    /// The id becomes a blob key and a URL path segment, so it is limited
    /// to URL-unreserved characters
    pub fn validate(&self) -> Result<()> {
        validate_id(&self.id)
    }
}

pub(crate) fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(CertError::Validation("id must not be empty".to_string()));
    }
    let unreserved = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'));
    if !unreserved || id == "." || id == ".." {
        return Err(CertError::Validation(format!("invalid id '{}'", id)));
    }
    Ok(())
}

/// What happens when rendering or publishing the PDF fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishPolicy {
    /// Log the failure and still answer with the URL
    #[default]
    BestEffort,
    /// Fail the issuance request
    Strict,
}

impl PublishPolicy {
    pub fn from_flag(best_effort_publish: bool) -> Self {
        if best_effort_publish {
            PublishPolicy::BestEffort
        } else {
            PublishPolicy::Strict
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishStatus {
    Published,
    Failed(String),
}

/// Result of one issuance call
#[derive(Debug, Clone)]
pub struct IssueOutcome {
    pub url: String,

    /// The record of issuance, as stored
    pub record: CertificateRecord,

    /// True if this call created the record
    pub created: bool,

    pub published: PublishStatus,
}

/// Renders, stores and publishes certificates
pub struct IssuanceService {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    renderer: Arc<dyn TemplateRenderer>,
    engine: Arc<dyn DocumentEngine>,
    assets: CertificateAssets,
    public_base_url: String,
    policy: PublishPolicy,
    local_copy: Option<PathBuf>,
}

impl IssuanceService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        renderer: Arc<dyn TemplateRenderer>,
        engine: Arc<dyn DocumentEngine>,
        assets: CertificateAssets,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            records,
            blobs,
            renderer,
            engine,
            assets,
            public_base_url: public_base_url.into(),
            policy: PublishPolicy::default(),
            local_copy: None,
        }
    }

    pub fn with_policy(mut self, policy: PublishPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Also write every rendered PDF to `path` (offline mode)
    pub fn with_local_copy(mut self, path: Option<PathBuf>) -> Self {
        self.local_copy = path;
        self
    }

    /// Issues the certificate for `request.id`.
    ///
    /// Creates the record on first issuance only; later calls reuse it and
    /// print its original date. Record store failures always propagate.
    /// Render and publish failures propagate only under
    /// [`PublishPolicy::Strict`].
    pub async fn issue(&self, request: IssueRequest) -> Result<IssueOutcome> {
        request.validate()?;

        let now = Utc::now();
        let existing = lookup(self.records.as_ref(), &request.id).await?;
        let date = effective_date(existing.as_ref(), now);

        let (record, created) = match existing {
            Some(record) => {
                debug!("Reusing record for '{}' issued {}", record.id, record.issued_at);
                (record, false)
            }
            None => {
                let record = CertificateRecord::new(
                    request.id.clone(),
                    request.name.clone(),
                    request.grade.clone(),
                    now,
                );
                self.records.put(record.clone()).await?;
                info!("Created record for '{}'", record.id);
                (record, true)
            }
        };

        let published = match self.render_and_publish(&request, date).await {
            Ok(()) => PublishStatus::Published,
            Err(e) => match self.policy {
                PublishPolicy::BestEffort => {
                    error!("Failed to publish certificate '{}': {}", request.id, e);
                    PublishStatus::Failed(e.to_string())
                }
                PublishPolicy::Strict => return Err(e),
            },
        };

        Ok(IssueOutcome {
            url: certificate_url(&self.public_base_url, &request.id),
            record,
            created,
            published,
        })
    }

    async fn render_and_publish(&self, request: &IssueRequest, date: DateTime<Utc>) -> Result<()> {
        let medal = self.assets.load_seal_base64().await?;
        let source = self.assets.load_template().await?;

        let data = TemplateData::new(
            request.id.clone(),
            request.name.clone(),
            request.grade.clone(),
            medal,
            format_certificate_date(date),
        );
        let html = self.renderer.render(&source, &data.to_replacements())?;

        let mut instance = self.engine.launch().await?;
        let result = self.print_and_store(instance.as_mut(), &request.id, &html).await;

        if let Err(e) = instance.close().await {
            warn!("Failed to close document engine: {}", e);
        }

        result
    }

    async fn print_and_store(
        &self,
        instance: &mut dyn EngineInstance,
        id: &str,
        html: &str,
    ) -> Result<()> {
        let mut options = PdfOptions::certificate();
        options.path = self.local_copy.clone();

        let pdf = instance.render_to_pdf(html, &options).await?;

        self.blobs
            .put_object(&certificate_key(id), pdf, Visibility::PublicRead, PDF_CONTENT_TYPE)
            .await
    }
}
