//! Request/response bodies

use serde::{Deserialize, Serialize};

use crate::record::CertificateRecord;

pub const ISSUED_MESSAGE: &str = "Certificate created successfully!";
pub const VALID_MESSAGE: &str = "Valid certificate";
pub const INVALID_MESSAGE: &str = "Invalid certificate";

/// Envelope shared by every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueData {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyData {
    #[serde(rename = "userCertificate")]
    pub user_certificate: CertificateRecord,
    pub url: String,
}

pub fn issued(url: String) -> ApiResponse<IssueData> {
    ApiResponse::ok(ISSUED_MESSAGE, IssueData { url })
}

pub fn verified(user_certificate: CertificateRecord, url: String) -> ApiResponse<VerifyData> {
    ApiResponse::ok(VALID_MESSAGE, VerifyData { user_certificate, url })
}
