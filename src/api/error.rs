//! Unified API error handling
//!
//! This module provides a consistent error response format across all API
//! endpoints.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use uuid::Uuid;

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent
/// error handling. The inbound-email webhook is the one exception: it
/// answers 200 regardless of outcome.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Vendor not found (404)
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    /// RFP not found (404)
    #[error("RFP not found: {0}")]
    RfpNotFound(String),

    /// Proposal not found (404)
    #[error("Proposal not found: {0}")]
    ProposalNotFound(String),

    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),

    /// External service error (502)
    #[error("External service error: {0}")]
    #[allow(dead_code)]
    ExternalService(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_)
            | ApiError::VendorNotFound(_)
            | ApiError::RfpNotFound(_)
            | ApiError::ProposalNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::VendorNotFound(_) => "vendor_not_found",
            ApiError::RfpNotFound(_) => "rfp_not_found",
            ApiError::ProposalNotFound(_) => "proposal_not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal_error",
            ApiError::Database(_) => "database_error",
            ApiError::ExternalService(_) => "external_service_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<crate::db::DbError> for ApiError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::NotFound(id) => ApiError::NotFound(id),
            crate::db::DbError::Duplicate(key) => {
                ApiError::BadRequest(format!("Already exists: {key}"))
            }
            crate::db::DbError::Referenced(id) => ApiError::BadRequest(format!(
                "Record {id} is still referenced by proposals or dispatch records"
            )),
            _ => ApiError::Database(err.to_string()),
        }
    }
}

impl From<crate::service::llm::ExtractError> for ApiError {
    fn from(err: crate::service::llm::ExtractError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<crate::service::intake::IntakeError> for ApiError {
    fn from(err: crate::service::intake::IntakeError) -> Self {
        match err {
            crate::service::intake::IntakeError::InputTooShort => {
                ApiError::BadRequest(err.to_string())
            }
            crate::service::intake::IntakeError::Extraction(e) => ApiError::Internal(e.to_string()),
            crate::service::intake::IntakeError::Db(e) => e.into(),
        }
    }
}

impl From<crate::service::dispatch::DispatchError> for ApiError {
    fn from(err: crate::service::dispatch::DispatchError) -> Self {
        match err {
            crate::service::dispatch::DispatchError::NoVendors => {
                ApiError::BadRequest(err.to_string())
            }
            crate::service::dispatch::DispatchError::RfpNotFound(id) => ApiError::RfpNotFound(id),
            crate::service::dispatch::DispatchError::Db(e) => e.into(),
        }
    }
}

impl From<crate::service::inbound::InboundError> for ApiError {
    fn from(err: crate::service::inbound::InboundError) -> Self {
        match err {
            crate::service::inbound::InboundError::Extraction(e) => {
                ApiError::Internal(e.to_string())
            }
            crate::service::inbound::InboundError::Db(crate::db::DbError::NotFound(id)) => {
                ApiError::NotFound(id)
            }
            crate::service::inbound::InboundError::Db(e) => e.into(),
        }
    }
}

impl From<crate::service::comparison::ComparisonError> for ApiError {
    fn from(err: crate::service::comparison::ComparisonError) -> Self {
        match err {
            crate::service::comparison::ComparisonError::NoProposals => {
                ApiError::BadRequest(err.to_string())
            }
            crate::service::comparison::ComparisonError::ProposalNotFound { .. } => {
                ApiError::ProposalNotFound(err.to_string())
            }
            crate::service::comparison::ComparisonError::Extraction(e) => {
                ApiError::Internal(e.to_string())
            }
            crate::service::comparison::ComparisonError::Invalid(msg) => ApiError::Internal(msg),
            crate::service::comparison::ComparisonError::Db(e) => e.into(),
        }
    }
}
