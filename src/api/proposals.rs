//! REST API endpoints for proposals, comparison, and award

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::error::ApiError;
use crate::db::repository::{ProposalRepository, RfpRepository};
use crate::model::{Proposal, Rfp, Vendor};
use crate::service::comparison::Comparison;
use crate::service::ComparisonService;

/// Query parameters for listing proposals
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProposalsParams {
    /// Restrict the listing to one RFP
    pub rfp_id: Option<String>,
}

/// A proposal with the vendor attached
#[derive(Debug, Serialize, ToSchema)]
pub struct ProposalWithVendor {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub vendor: Vendor,
}

/// A proposal with its vendor and the RFP it answers
#[derive(Debug, Serialize, ToSchema)]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub vendor: Vendor,
    pub rfp: Rfp,
}

/// Response for a comparison request
#[derive(Debug, Serialize, ToSchema)]
pub struct ComparisonResponse {
    pub rfp: Rfp,
    pub proposals: Vec<ProposalWithVendor>,
    pub comparison: Comparison,
}

/// Response for an award request
#[derive(Debug, Serialize, ToSchema)]
pub struct AwardResponse {
    pub message: String,
    pub proposal: ProposalWithVendor,
}

/// List proposals, optionally filtered by RFP
#[utoipa::path(
    get,
    path = "/api/proposals",
    params(ListProposalsParams),
    responses(
        (status = 200, description = "Proposals retrieved successfully", body = [ProposalWithVendor])
    ),
    tag = "proposals"
)]
#[get("/api/proposals")]
pub async fn list_proposals(
    proposals: web::Data<ProposalRepository>,
    query: web::Query<ListProposalsParams>,
) -> Result<HttpResponse, ApiError> {
    let listed = proposals.list(query.rfp_id.as_deref()).await?;

    let response: Vec<ProposalWithVendor> = listed
        .into_iter()
        .map(|(proposal, vendor)| ProposalWithVendor { proposal, vendor })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Compare the proposals of an RFP
#[utoipa::path(
    get,
    path = "/api/proposals/compare/{rfp_id}",
    params(("rfp_id" = String, Path, description = "RFP ID")),
    responses(
        (status = 200, description = "Comparison produced", body = ComparisonResponse),
        (status = 400, description = "No proposals to compare"),
        (status = 404, description = "RFP not found")
    ),
    tag = "proposals"
)]
#[get("/api/proposals/compare/{rfp_id}")]
pub async fn compare_proposals(
    comparison: web::Data<ComparisonService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let rfp_id = path.into_inner();

    let outcome = comparison.compare(&rfp_id).await?;

    Ok(HttpResponse::Ok().json(ComparisonResponse {
        rfp: outcome.rfp,
        proposals: outcome
            .proposals
            .into_iter()
            .map(|(proposal, vendor)| ProposalWithVendor { proposal, vendor })
            .collect(),
        comparison: outcome.comparison,
    }))
}

/// Get a proposal with its vendor and RFP
#[utoipa::path(
    get,
    path = "/api/proposals/{id}",
    params(("id" = String, Path, description = "Proposal ID")),
    responses(
        (status = 200, description = "Proposal retrieved successfully", body = ProposalDetail),
        (status = 404, description = "Proposal not found")
    ),
    tag = "proposals"
)]
#[get("/api/proposals/{id}")]
pub async fn get_proposal(
    proposals: web::Data<ProposalRepository>,
    rfps: web::Data<RfpRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let (proposal, vendor) = proposals.get(&id).await.map_err(|e| match e {
        crate::db::DbError::NotFound(_) => ApiError::ProposalNotFound(id.clone()),
        other => other.into(),
    })?;
    let rfp = rfps.get(&proposal.rfp_id).await?;

    Ok(HttpResponse::Ok().json(ProposalDetail {
        proposal,
        vendor,
        rfp,
    }))
}

/// Award an RFP to a vendor
#[utoipa::path(
    post,
    path = "/api/proposals/{rfp_id}/award/{vendor_id}",
    params(
        ("rfp_id" = String, Path, description = "RFP ID"),
        ("vendor_id" = String, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "RFP awarded", body = AwardResponse),
        (status = 404, description = "No proposal for this RFP and vendor")
    ),
    tag = "proposals"
)]
#[post("/api/proposals/{rfp_id}/award/{vendor_id}")]
pub async fn award_proposal(
    comparison: web::Data<ComparisonService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (rfp_id, vendor_id) = path.into_inner();

    let outcome = comparison.award(&rfp_id, &vendor_id).await?;

    Ok(HttpResponse::Ok().json(AwardResponse {
        message: format!("RFP awarded to {}", outcome.vendor.name),
        proposal: ProposalWithVendor {
            proposal: outcome.proposal,
            vendor: outcome.vendor,
        },
    }))
}

/// Configure proposal routes.
///
/// `compare/{rfp_id}` registers before `{id}` so the static segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_proposals)
        .service(compare_proposals)
        .service(get_proposal)
        .service(award_proposal);
}
