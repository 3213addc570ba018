use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template file not found: {0}")]
    TemplateNotFound(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Certificate not found: {0}")]
    NotFound(String),

    #[error("Record store error: {0}")]
    RecordStore(String),

    #[error("Blob store error: {0}")]
    BlobStore(String),

    #[error("Document engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CertError {
    /// HTTP status for this error.
    ///
    /// Unknown certificates answer 400, not 404, to stay compatible with
    /// existing verification clients.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CertError::Validation(_) | CertError::NotFound(_) => StatusCode::BAD_REQUEST,
            CertError::TemplateNotFound(_)
            | CertError::Asset(_)
            | CertError::BlobStore(_)
            | CertError::Engine(_) => StatusCode::BAD_GATEWAY,
            CertError::Io(_)
            | CertError::Serialization(_)
            | CertError::RecordStore(_)
            | CertError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            CertError::Io(_) => "IO_ERROR",
            CertError::Serialization(_) => "SERIALIZATION_ERROR",
            CertError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            CertError::Asset(_) => "ASSET_ERROR",
            CertError::Validation(_) => "VALIDATION_ERROR",
            CertError::NotFound(_) => "CERTIFICATE_NOT_FOUND",
            CertError::RecordStore(_) => "RECORD_STORE_ERROR",
            CertError::BlobStore(_) => "BLOB_STORE_ERROR",
            CertError::Engine(_) => "ENGINE_ERROR",
            CertError::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CertError>;
