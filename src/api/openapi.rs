//! OpenAPI specification endpoints

use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rfpflow",
        description = "AI-assisted procurement workflow API"
    ),
    paths(
        crate::api::health::liveness,
        crate::api::health::readiness,
        crate::api::vendors::list_vendors,
        crate::api::vendors::get_vendor,
        crate::api::vendors::create_vendor,
        crate::api::vendors::update_vendor,
        crate::api::vendors::delete_vendor,
        crate::api::rfps::list_rfps,
        crate::api::rfps::get_rfp,
        crate::api::rfps::create_rfp,
        crate::api::rfps::send_rfp,
        crate::api::rfps::delete_rfp,
        crate::api::proposals::list_proposals,
        crate::api::proposals::compare_proposals,
        crate::api::proposals::get_proposal,
        crate::api::proposals::award_proposal,
        crate::api::webhooks::inbound_email,
        crate::api::webhooks::simulate_response,
        crate::api::events::stream_events,
    ),
    components(schemas(
        crate::model::Vendor,
        crate::model::vendor::VendorPatch,
        crate::model::Rfp,
        crate::model::RfpItem,
        crate::model::RfpStatus,
        crate::model::RfpVendor,
        crate::model::DispatchStatus,
        crate::model::Proposal,
        crate::model::UnitPrice,
        crate::api::vendors::CreateVendorRequest,
        crate::api::vendors::VendorWithCounts,
        crate::api::vendors::VendorDetail,
        crate::api::vendors::RelationCountsDto,
        crate::api::rfps::CreateRfpRequest,
        crate::api::rfps::SendRfpRequest,
        crate::api::rfps::SendRfpResponse,
        crate::api::rfps::PreviewLinkDto,
        crate::api::rfps::RfpWithCounts,
        crate::api::rfps::RfpDetail,
        crate::api::rfps::DispatchWithVendor,
        crate::api::proposals::ProposalWithVendor,
        crate::api::proposals::ProposalDetail,
        crate::api::proposals::ComparisonResponse,
        crate::api::proposals::AwardResponse,
        crate::api::webhooks::SimulateRequest,
        crate::service::comparison::Comparison,
        crate::service::comparison::Evaluation,
        crate::service::comparison::Recommendation,
        crate::service::comparison::ComparisonMatrix,
        crate::service::dispatch::VendorOutcome,
        crate::service::events::ProposalReceived,
    )),
    tags(
        (name = "vendors", description = "Vendor directory"),
        (name = "rfps", description = "RFP intake and dispatch"),
        (name = "proposals", description = "Proposals, comparison, and award"),
        (name = "webhooks", description = "Inbound vendor email"),
        (name = "events", description = "Realtime updates"),
        (name = "health", description = "Health probes"),
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/yaml")
        .body(ApiDoc::openapi().to_yaml().unwrap_or_default())
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
