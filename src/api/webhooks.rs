//! Webhook endpoints for inbound vendor email
//!
//! The inbound-email endpoint always answers 200 with a success-shaped
//! body, whatever happens internally; the upstream email provider retries
//! on error statuses and must never be given one. The simulate endpoint is
//! a direct API call and surfaces its errors normally.

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures::TryStreamExt;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::proposals::ProposalWithVendor;
use crate::service::inbound::{InboundEmail, IngestOutcome};
use crate::service::InboundService;

/// Request body for simulating a vendor response
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    #[serde(default)]
    pub rfp_id: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub email_content: Option<String>,
}

/// Inbound email webhook (multipart form: from, to, subject, text, html).
///
/// Always responds 200 with a message describing the outcome.
#[utoipa::path(
    post,
    path = "/api/webhooks/inbound-email",
    responses(
        (status = 200, description = "Outcome message; never an error status")
    ),
    tag = "webhooks"
)]
#[post("/api/webhooks/inbound-email")]
pub async fn inbound_email(
    inbound: web::Data<InboundService>,
    payload: Multipart,
) -> HttpResponse {
    let fields = match collect_form_fields(payload).await {
        Ok(fields) => fields,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read inbound email webhook payload");
            return ok_message("Error processing email");
        }
    };

    let email = InboundEmail {
        from: fields
            .get("from")
            .or_else(|| fields.get("sender"))
            .cloned()
            .unwrap_or_default(),
        to: fields.get("to").cloned(),
        subject: fields.get("subject").cloned(),
        text: fields.get("text").cloned(),
        html: fields.get("html").cloned(),
    };

    tracing::info!(from = %email.from, to = ?email.to, subject = ?email.subject, "Received inbound email webhook");

    match inbound.ingest_webhook(&email).await {
        Ok(IngestOutcome::UnknownVendor) => ok_message("Unknown vendor"),
        Ok(IngestOutcome::NoMatchingRfp) => ok_message("Could not match to RFP"),
        Ok(IngestOutcome::RfpNotFound) => ok_message("RFP not found"),
        Ok(IngestOutcome::Stored { proposal_id, .. }) => {
            HttpResponse::Ok().json(serde_json::json!({
                "message": "Proposal received",
                "proposalId": proposal_id
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Inbound email processing failed");
            ok_message("Error processing email")
        }
    }
}

/// Simulate a vendor response without real email
#[utoipa::path(
    post,
    path = "/api/webhooks/simulate-response",
    request_body = SimulateRequest,
    responses(
        (status = 201, description = "Proposal created or updated"),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "RFP or vendor not found")
    ),
    tag = "webhooks"
)]
#[post("/api/webhooks/simulate-response")]
pub async fn simulate_response(
    inbound: web::Data<InboundService>,
    body: web::Json<SimulateRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let (Some(rfp_id), Some(vendor_id), Some(email_content)) =
        (body.rfp_id, body.vendor_id, body.email_content)
    else {
        return Err(ApiError::BadRequest(
            "rfpId, vendorId, and emailContent required".to_string(),
        ));
    };

    let (proposal, vendor) = inbound
        .ingest_simulated(&rfp_id, &vendor_id, &email_content)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Simulated response processed",
        "proposal": ProposalWithVendor { proposal, vendor }
    })))
}

fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": message }))
}

/// Drain a multipart payload into a name → text map
async fn collect_form_fields(
    mut payload: Multipart,
) -> Result<HashMap<String, String>, actix_multipart::MultipartError> {
    let mut fields = HashMap::new();

    while let Some(mut field) = payload.try_next().await? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            data.extend_from_slice(&chunk);
        }

        fields.insert(name, String::from_utf8_lossy(&data).into_owned());
    }

    Ok(fields)
}

/// Configure webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(inbound_email).service(simulate_response);
}
