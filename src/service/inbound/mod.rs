//! Inbound proposal matcher
//!
//! Best-effort correlation of an inbound email to a known vendor and a
//! specific RFP, followed by structured extraction and a proposal upsert.
//! The webhook entry point never hard-fails; every unresolvable input maps
//! to a benign outcome.

pub mod matching;
pub mod prompts;

use std::sync::Arc;

use serde::Deserialize;

use crate::db::repository::{ProposalRepository, ProposalUpsert, RfpRepository, VendorRepository};
use crate::db::DbError;
use crate::model::vendor::email_matches;
use crate::model::{Proposal, Rfp, UnitPrice, Vendor};
use crate::service::events::{EventBroadcaster, ProposalReceived};
use crate::service::llm::{ExtractError, StructuredExtractor, DEFAULT_MODEL};
use self::prompts::{build_proposal_prompt, PROPOSAL_SYSTEM_PROMPT};

/// Environment variable for the proposal-extraction model
const ENV_PROPOSAL_MODEL: &str = "RFPFLOW_PROPOSAL_MODEL";

#[derive(Debug, thiserror::Error)]
pub enum InboundError {
    #[error("Proposal extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Fields of an inbound email, from the webhook or a simulation
#[derive(Debug, Clone, Default)]
pub struct InboundEmail {
    pub from: String,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

impl InboundEmail {
    /// Body used for extraction: plain text preferred, HTML converted to
    /// markdown as fallback.
    pub fn content(&self) -> String {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return text.to_string();
        }

        self.html
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .map(html_to_markdown)
            .unwrap_or_default()
    }
}

/// Convert HTML to Markdown
fn html_to_markdown(html: &str) -> String {
    htmd::convert(html).unwrap_or_else(|_| html.to_string())
}

/// Outcome of webhook ingestion. Every variant is answered 200.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Sender did not resolve to a directory vendor
    UnknownVendor,
    /// No explicit marker and no SENT dispatch record to fall back to
    NoMatchingRfp,
    /// The resolved id does not correspond to an existing RFP
    RfpNotFound,
    /// Proposal stored and broadcast
    Stored {
        proposal_id: String,
        rfp_id: String,
        vendor_id: String,
    },
}

/// Shape the extractor is asked to return for a vendor email
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProposal {
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub unit_prices: Vec<UnitPrice>,
    #[serde(default)]
    pub delivery_days: Option<i32>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub is_complete: Option<bool>,
}

/// Service correlating inbound vendor emails to proposals
pub struct InboundService {
    extractor: Arc<dyn StructuredExtractor>,
    vendors: VendorRepository,
    rfps: RfpRepository,
    proposals: ProposalRepository,
    events: EventBroadcaster,
    model: String,
}

impl InboundService {
    pub fn new(
        extractor: Arc<dyn StructuredExtractor>,
        vendors: VendorRepository,
        rfps: RfpRepository,
        proposals: ProposalRepository,
        events: EventBroadcaster,
    ) -> Self {
        let model =
            std::env::var(ENV_PROPOSAL_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            extractor,
            vendors,
            rfps,
            proposals,
            events,
            model,
        }
    }

    /// Ingest an email pushed by the inbound webhook.
    ///
    /// The pipeline terminates early with a benign outcome whenever the
    /// sender or the RFP cannot be resolved; only extraction and
    /// persistence failures surface as errors, and the webhook handler
    /// downgrades those to a benign acknowledgment as well.
    pub async fn ingest_webhook(&self, email: &InboundEmail) -> Result<IngestOutcome, InboundError> {
        let sender = matching::extract_sender_address(&email.from);

        let Some(vendor) = self.resolve_vendor(&sender).await? else {
            tracing::info!(sender = %sender, "Inbound email from unknown vendor");
            return Ok(IngestOutcome::UnknownVendor);
        };

        let rfp_id = match matching::extract_rfp_id(email.subject.as_deref(), email.text.as_deref())
        {
            Some(id) => Some(id),
            None => self
                .rfps
                .latest_sent_dispatch(&vendor.id)
                .await?
                .map(|dispatch| dispatch.rfp_id),
        };

        let Some(rfp_id) = rfp_id else {
            tracing::info!(vendor = %vendor.id, "Inbound email could not be matched to an RFP");
            return Ok(IngestOutcome::NoMatchingRfp);
        };

        let Some(rfp) = self.rfps.try_get(&rfp_id).await? else {
            tracing::info!(vendor = %vendor.id, rfp = %rfp_id, "Inbound email references a missing RFP");
            return Ok(IngestOutcome::RfpNotFound);
        };

        let proposal = self.extract_and_store(&rfp, &vendor, email).await?;

        Ok(IngestOutcome::Stored {
            proposal_id: proposal.id,
            rfp_id: rfp.id,
            vendor_id: vendor.id,
        })
    }

    /// Ingest a manually simulated vendor response.
    ///
    /// Unlike the webhook path, the RFP and vendor are supplied explicitly
    /// and missing records surface as not-found errors.
    pub async fn ingest_simulated(
        &self,
        rfp_id: &str,
        vendor_id: &str,
        email_content: &str,
    ) -> Result<(Proposal, Vendor), InboundError> {
        let rfp = self.rfps.get(rfp_id).await?;
        let vendor = self.vendors.get(vendor_id).await?;

        let email = InboundEmail {
            from: vendor.email.clone(),
            subject: Some(format!("Re: RFP - {}", rfp.title)),
            text: Some(email_content.to_string()),
            ..Default::default()
        };

        let proposal = self.extract_and_store(&rfp, &vendor, &email).await?;
        Ok((proposal, vendor))
    }

    /// Resolve a sender address against the vendor directory with the
    /// single containment predicate.
    async fn resolve_vendor(&self, sender: &str) -> Result<Option<Vendor>, DbError> {
        let vendors = self.vendors.list_all().await?;
        Ok(vendors
            .into_iter()
            .find(|vendor| email_matches(sender, &vendor.email)))
    }

    /// Steps 5-7 of the pipeline: delegate extraction, upsert the proposal,
    /// broadcast the realtime event.
    async fn extract_and_store(
        &self,
        rfp: &Rfp,
        vendor: &Vendor,
        email: &InboundEmail,
    ) -> Result<Proposal, InboundError> {
        let content = email.content();
        let prompt = build_proposal_prompt(rfp, &content);

        let value = self
            .extractor
            .extract(&self.model, PROPOSAL_SYSTEM_PROMPT, &prompt)
            .await?;

        let extracted: ExtractedProposal = serde_json::from_value(value.clone())
            .map_err(|e| InboundError::Extraction(ExtractError::Malformed(e.to_string())))?;

        let upsert = ProposalUpsert {
            rfp_id: rfp.id.clone(),
            vendor_id: vendor.id.clone(),
            raw_email: content,
            raw_subject: email.subject.clone(),
            // The extraction output is retained verbatim.
            parsed_data: value,
            total_price: extracted.total_price,
            unit_prices: extracted.unit_prices,
            delivery_days: extracted.delivery_days,
            warranty: extracted.warranty,
            payment_terms: extracted.payment_terms,
        };

        let proposal = self.proposals.upsert(&upsert).await?;

        tracing::info!(
            proposal = %proposal.id,
            rfp = %rfp.id,
            vendor = %vendor.id,
            total_price = ?proposal.total_price,
            "Proposal stored"
        );

        self.events.publish(ProposalReceived {
            proposal_id: proposal.id.clone(),
            rfp_id: rfp.id.clone(),
            vendor_id: vendor.id.clone(),
        });

        Ok(proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_prefers_plain_text() {
        let email = InboundEmail {
            from: "sales@techsupply.com".to_string(),
            text: Some("Total Price: $27,250".to_string()),
            html: Some("<p>Total Price: $99,999</p>".to_string()),
            ..Default::default()
        };

        assert_eq!(email.content(), "Total Price: $27,250");
    }

    #[test]
    fn test_content_falls_back_to_html() {
        let email = InboundEmail {
            from: "sales@techsupply.com".to_string(),
            text: Some("   ".to_string()),
            html: Some("<p>Total Price: $27,250</p>".to_string()),
            ..Default::default()
        };

        assert!(email.content().contains("Total Price: $27,250"));
    }

    #[test]
    fn test_content_empty_when_both_absent() {
        let email = InboundEmail {
            from: "sales@techsupply.com".to_string(),
            ..Default::default()
        };

        assert_eq!(email.content(), "");
    }

    #[test]
    fn test_extracted_proposal_tolerates_missing_fields() {
        let extracted: ExtractedProposal = serde_json::from_value(serde_json::json!({
            "totalPrice": 27250.0
        }))
        .unwrap();

        assert_eq!(extracted.total_price, Some(27250.0));
        assert!(extracted.unit_prices.is_empty());
        assert_eq!(extracted.is_complete, None);
    }
}
