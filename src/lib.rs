//! # certissue
//!
//! Issues PDF completion certificates and verifies them by identifier.

pub mod api;
pub mod blob;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod service;
pub mod template;

// Re-exports
pub use error::{CertError, Result};
pub use record::{CertificateRecord, RecordStore};
pub use blob::BlobStore;
pub use engine::{DocumentEngine, EngineInstance, PdfOptions};
pub use template::{PlaceholderReplacer, TemplateData, TemplateRenderer};
pub use service::{IssuanceService, IssueRequest, PublishPolicy, VerificationService};
pub use cli::{Cli, Commands};
pub use config::Config;
