//! Dispatch pipeline: email an RFP to a selected vendor set
//!
//! Sends are independent per vendor; each attempt records its own dispatch
//! row and one failure never aborts the rest of the batch.

pub mod template;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::repository::{RfpRepository, VendorRepository};
use crate::db::DbError;
use crate::model::{DispatchStatus, RfpStatus};
use crate::service::mailer::{Mailer, OutboundEmail};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Select at least one vendor")]
    NoVendors,

    #[error("RFP not found: {0}")]
    RfpNotFound(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Outcome of one vendor's send attempt
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorOutcome {
    pub vendor_id: String,
    pub vendor_name: String,
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate outcome of a dispatch request
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub results: Vec<VendorOutcome>,
}

impl DispatchOutcome {
    /// Preview links for the sends that produced one
    pub fn preview_urls(&self) -> Vec<(String, String)> {
        self.results
            .iter()
            .filter_map(|r| {
                r.preview_url
                    .as_ref()
                    .map(|url| (r.vendor_name.clone(), url.clone()))
            })
            .collect()
    }
}

/// Service that emails RFPs to vendors and records delivery status
pub struct DispatchService {
    vendors: VendorRepository,
    rfps: RfpRepository,
    mailer: Arc<dyn Mailer>,
}

impl DispatchService {
    pub fn new(vendors: VendorRepository, rfps: RfpRepository, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            vendors,
            rfps,
            mailer,
        }
    }

    /// Send an RFP to a set of vendors.
    ///
    /// Unknown vendor ids are silently ignored. After all attempts the RFP
    /// advances to SENT regardless of individual outcomes, including the
    /// case where every send failed.
    pub async fn send_to_vendors(
        &self,
        rfp_id: &str,
        vendor_ids: &[String],
    ) -> Result<DispatchOutcome, DispatchError> {
        if vendor_ids.is_empty() {
            return Err(DispatchError::NoVendors);
        }

        let rfp = self
            .rfps
            .try_get(rfp_id)
            .await?
            .ok_or_else(|| DispatchError::RfpNotFound(rfp_id.to_string()))?;

        let vendors = self.vendors.list_by_ids(vendor_ids).await?;

        let subject = template::render_subject(&rfp);
        let mut results = Vec::with_capacity(vendors.len());

        for vendor in &vendors {
            let email = OutboundEmail {
                to_name: vendor.name.clone(),
                to_address: vendor.email.clone(),
                subject: subject.clone(),
                body: template::render_body(&rfp, vendor),
            };

            match self.mailer.send(&email).await {
                Ok(receipt) => {
                    self.rfps
                        .upsert_dispatch(
                            &rfp.id,
                            &vendor.id,
                            DispatchStatus::Sent,
                            Some(Utc::now()),
                        )
                        .await?;

                    results.push(VendorOutcome {
                        vendor_id: vendor.id.clone(),
                        vendor_name: vendor.name.clone(),
                        status: DispatchStatus::Sent,
                        preview_url: receipt.preview_url,
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(rfp = %rfp.id, vendor = %vendor.id, error = %e, "RFP email send failed");

                    self.rfps
                        .upsert_dispatch(&rfp.id, &vendor.id, DispatchStatus::Failed, None)
                        .await?;

                    results.push(VendorOutcome {
                        vendor_id: vendor.id.clone(),
                        vendor_name: vendor.name.clone(),
                        status: DispatchStatus::Failed,
                        preview_url: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        // The status advances even when every send failed.
        self.rfps.advance_status(&rfp.id, RfpStatus::Sent).await?;

        let sent = results
            .iter()
            .filter(|r| r.status == DispatchStatus::Sent)
            .count();
        tracing::info!(
            rfp = %rfp.id,
            requested = vendor_ids.len(),
            resolved = vendors.len(),
            sent,
            failed = results.len() - sent,
            "RFP dispatch complete"
        );

        Ok(DispatchOutcome { results })
    }
}
