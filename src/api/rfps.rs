//! REST API endpoints for RFP intake, listing, and dispatch

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::proposals::ProposalWithVendor;
use crate::api::vendors::RelationCountsDto;
use crate::db::repository::{ProposalRepository, RfpRepository};
use crate::model::{Rfp, RfpVendor, Vendor};
use crate::service::dispatch::VendorOutcome;
use crate::service::{DispatchService, IntakeService};

/// Request body for creating an RFP from natural language
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRfpRequest {
    pub raw_input: String,
}

/// Request body for dispatching an RFP
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendRfpRequest {
    #[serde(default)]
    pub vendor_ids: Vec<String>,
}

/// An RFP with its relation counts
#[derive(Debug, Serialize, ToSchema)]
pub struct RfpWithCounts {
    #[serde(flatten)]
    pub rfp: Rfp,
    #[serde(rename = "_count")]
    pub count: RelationCountsDto,
}

/// A dispatch record with the vendor attached
#[derive(Debug, Serialize, ToSchema)]
pub struct DispatchWithVendor {
    #[serde(flatten)]
    pub record: RfpVendor,
    pub vendor: Vendor,
}

/// An RFP with its dispatch records and proposals
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfpDetail {
    #[serde(flatten)]
    pub rfp: Rfp,
    pub rfp_vendors: Vec<DispatchWithVendor>,
    pub proposals: Vec<ProposalWithVendor>,
}

/// Preview link for a sent email
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLinkDto {
    pub vendor: String,
    pub preview_url: String,
}

/// Response for a dispatch request
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendRfpResponse {
    pub message: String,
    pub results: Vec<VendorOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_preview_urls: Vec<PreviewLinkDto>,
}

/// List RFPs, newest first
#[utoipa::path(
    get,
    path = "/api/rfps",
    responses(
        (status = 200, description = "RFPs retrieved successfully", body = [RfpWithCounts])
    ),
    tag = "rfps"
)]
#[get("/api/rfps")]
pub async fn list_rfps(rfps: web::Data<RfpRepository>) -> Result<HttpResponse, ApiError> {
    let listed = rfps.list().await?;

    let response: Vec<RfpWithCounts> = listed
        .into_iter()
        .map(|(rfp, count)| RfpWithCounts {
            rfp,
            count: RelationCountsDto {
                proposals: count.proposals,
                rfp_vendors: count.rfp_vendors,
            },
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get an RFP with items, dispatch records, and proposals
#[utoipa::path(
    get,
    path = "/api/rfps/{id}",
    params(("id" = String, Path, description = "RFP ID")),
    responses(
        (status = 200, description = "RFP retrieved successfully", body = RfpDetail),
        (status = 404, description = "RFP not found")
    ),
    tag = "rfps"
)]
#[get("/api/rfps/{id}")]
pub async fn get_rfp(
    rfps: web::Data<RfpRepository>,
    proposals: web::Data<ProposalRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let rfp = rfps
        .try_get(&id)
        .await?
        .ok_or_else(|| ApiError::RfpNotFound(id.clone()))?;

    let dispatches = rfps.dispatches_for_rfp(&id).await?;
    let rfp_proposals = proposals.list(Some(&id)).await?;

    Ok(HttpResponse::Ok().json(RfpDetail {
        rfp,
        rfp_vendors: dispatches
            .into_iter()
            .map(|(record, vendor)| DispatchWithVendor { record, vendor })
            .collect(),
        proposals: rfp_proposals
            .into_iter()
            .map(|(proposal, vendor)| ProposalWithVendor { proposal, vendor })
            .collect(),
    }))
}

/// Create an RFP from a natural-language request
#[utoipa::path(
    post,
    path = "/api/rfps",
    request_body = CreateRfpRequest,
    responses(
        (status = 201, description = "RFP created with status DRAFT", body = Rfp),
        (status = 400, description = "Input too short"),
        (status = 500, description = "Extraction failed")
    ),
    tag = "rfps"
)]
#[post("/api/rfps")]
pub async fn create_rfp(
    intake: web::Data<IntakeService>,
    body: web::Json<CreateRfpRequest>,
) -> Result<HttpResponse, ApiError> {
    let rfp = intake.create_from_text(&body.raw_input).await?;
    Ok(HttpResponse::Created().json(rfp))
}

/// Send an RFP to a set of vendors
#[utoipa::path(
    post,
    path = "/api/rfps/{id}/send",
    params(("id" = String, Path, description = "RFP ID")),
    request_body = SendRfpRequest,
    responses(
        (status = 200, description = "Dispatch attempted for every resolved vendor", body = SendRfpResponse),
        (status = 400, description = "No vendors selected"),
        (status = 404, description = "RFP not found")
    ),
    tag = "rfps"
)]
#[post("/api/rfps/{id}/send")]
pub async fn send_rfp(
    dispatch: web::Data<DispatchService>,
    path: web::Path<String>,
    body: web::Json<SendRfpRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let outcome = dispatch.send_to_vendors(&id, &body.vendor_ids).await?;

    let email_preview_urls = outcome
        .preview_urls()
        .into_iter()
        .map(|(vendor, preview_url)| PreviewLinkDto {
            vendor,
            preview_url,
        })
        .collect();

    Ok(HttpResponse::Ok().json(SendRfpResponse {
        message: "RFP sent to vendors".to_string(),
        results: outcome.results,
        email_preview_urls,
    }))
}

/// Delete an RFP and everything attached to it
#[utoipa::path(
    delete,
    path = "/api/rfps/{id}",
    params(("id" = String, Path, description = "RFP ID")),
    responses(
        (status = 204, description = "RFP deleted"),
        (status = 404, description = "RFP not found")
    ),
    tag = "rfps"
)]
#[delete("/api/rfps/{id}")]
pub async fn delete_rfp(
    rfps: web::Data<RfpRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let deleted = rfps.delete(&id).await?;
    if !deleted {
        return Err(ApiError::RfpNotFound(id));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Configure RFP routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_rfps)
        .service(get_rfp)
        .service(create_rfp)
        .service(send_rfp)
        .service(delete_rfp);
}
