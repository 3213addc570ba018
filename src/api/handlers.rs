//! Endpoint handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::info;

use crate::api::dto::{self, ApiResponse, IssueData, VerifyData};
use crate::api::state::AppState;
use crate::error::CertError;
use crate::service::IssueRequest;

/// POST /generateCertificate
///
/// Answers 200 with the URL even if publishing failed, unless the strict
/// publish policy is configured.
pub async fn generate_certificate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<IssueData>>), CertError> {
    let request = IssueRequest::from_json(&body)?;
    info!("Issuing certificate '{}'", request.id);

    let outcome = state.issuance.issue(request).await?;
    Ok((StatusCode::OK, Json(dto::issued(outcome.url))))
}

/// GET /verifyCertificate/:id
pub async fn verify_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<VerifyData>>), CertError> {
    match state.verification.verify(&id).await? {
        Some(found) => Ok((StatusCode::OK, Json(dto::verified(found.record, found.url)))),
        None => Err(CertError::NotFound(id)),
    }
}
