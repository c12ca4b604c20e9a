//! Comparison & award engine
//!
//! Scores and ranks the proposals of an RFP through the extraction seam
//! (or a trivial single-candidate synthesis), persists the evaluations,
//! and finalizes awards.

pub mod prompts;
pub mod validation;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::repository::{ProposalRepository, RfpRepository};
use crate::db::DbError;
use crate::model::{Proposal, Rfp, RfpStatus, Vendor};
use crate::service::llm::{ExtractError, StructuredExtractor, DEFAULT_MODEL};
use self::prompts::{build_comparison_prompt, COMPARISON_SYSTEM_PROMPT};

/// Environment variable for the comparison model
const ENV_COMPARISON_MODEL: &str = "RFPFLOW_COMPARISON_MODEL";

/// Default score for a single uncontested proposal with no prior score
const SINGLE_PROPOSAL_SCORE: f64 = 75.0;

#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("No proposals to compare")]
    NoProposals,

    #[error("Proposal not found for RFP {rfp_id} and vendor {vendor_id}")]
    ProposalNotFound { rfp_id: String, vendor_id: String },

    #[error("Comparison extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Comparison output failed validation: {0}")]
    Invalid(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// One vendor's evaluation within a comparison
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub vendor_id: String,
    #[serde(default)]
    pub vendor_name: String,
    pub score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// The overall recommendation of a comparison
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_vendor_id: String,
    #[serde(default)]
    pub recommended_vendor_name: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub comparison_matrix: Option<ComparisonMatrix>,
}

/// Tabular factor-by-vendor comparison
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMatrix {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A full comparison: per-vendor evaluations plus one recommendation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub evaluations: Vec<Evaluation>,
    pub recommendation: Recommendation,
}

/// Result of a comparison request
#[derive(Debug)]
pub struct ComparisonOutcome {
    pub rfp: Rfp,
    pub proposals: Vec<(Proposal, Vendor)>,
    pub comparison: Comparison,
}

/// Result of an award request
#[derive(Debug)]
pub struct AwardOutcome {
    pub proposal: Proposal,
    pub vendor: Vendor,
}

/// Service that compares proposals and finalizes awards
pub struct ComparisonService {
    extractor: Arc<dyn StructuredExtractor>,
    rfps: RfpRepository,
    proposals: ProposalRepository,
    model: String,
}

impl ComparisonService {
    pub fn new(
        extractor: Arc<dyn StructuredExtractor>,
        rfps: RfpRepository,
        proposals: ProposalRepository,
    ) -> Self {
        let model =
            std::env::var(ENV_COMPARISON_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            extractor,
            rfps,
            proposals,
            model,
        }
    }

    /// Compare the proposals of an RFP.
    ///
    /// Zero proposals is a client error and mutates nothing. A single
    /// proposal yields a synthesized evaluation without touching the model
    /// or the database. Two or more delegate to the model; the resulting
    /// evaluations are persisted and the RFP advances to EVALUATING.
    pub async fn compare(&self, rfp_id: &str) -> Result<ComparisonOutcome, ComparisonError> {
        let rfp = self.rfps.get(rfp_id).await?;
        let proposals = self.proposals.list(Some(rfp_id)).await?;

        if proposals.is_empty() {
            return Err(ComparisonError::NoProposals);
        }

        if proposals.len() == 1 {
            let (proposal, vendor) = &proposals[0];
            let comparison = single_proposal_comparison(proposal, vendor);

            tracing::info!(rfp = %rfp.id, vendor = %vendor.id, "Single proposal, synthesized evaluation");

            return Ok(ComparisonOutcome {
                rfp,
                proposals,
                comparison,
            });
        }

        let prompt = build_comparison_prompt(&rfp, &proposals);
        let value = self
            .extractor
            .extract(&self.model, COMPARISON_SYSTEM_PROMPT, &prompt)
            .await?;

        let comparison: Comparison = serde_json::from_value(value)
            .map_err(|e| ComparisonError::Extraction(ExtractError::Malformed(e.to_string())))?;

        let known_vendor_ids: HashSet<String> = proposals
            .iter()
            .map(|(proposal, _)| proposal.vendor_id.clone())
            .collect();

        let result = validation::validate_comparison(&comparison, &known_vendor_ids);
        for warning in &result.warnings {
            tracing::warn!(rfp = %rfp.id, warning = %warning, "Comparison validation warning");
        }
        if !result.is_valid {
            return Err(ComparisonError::Invalid(result.errors.join("; ")));
        }

        for evaluation in &comparison.evaluations {
            self.proposals
                .apply_evaluation(
                    &rfp.id,
                    &evaluation.vendor_id,
                    evaluation.score,
                    &evaluation.summary,
                    &evaluation.strengths,
                    &evaluation.weaknesses,
                )
                .await?;
        }

        self.rfps
            .advance_status(&rfp.id, RfpStatus::Evaluating)
            .await?;

        // Re-read so the response reflects the persisted evaluations
        let rfp = self.rfps.get(rfp_id).await?;
        let proposals = self.proposals.list(Some(rfp_id)).await?;

        tracing::info!(
            rfp = %rfp.id,
            evaluations = comparison.evaluations.len(),
            recommended = %comparison.recommendation.recommended_vendor_id,
            "Proposal comparison complete"
        );

        Ok(ComparisonOutcome {
            rfp,
            proposals,
            comparison,
        })
    }

    /// Award an RFP to a vendor.
    ///
    /// Requires a proposal for the pair; the awarded vendor does not have
    /// to be the recommended one.
    pub async fn award(
        &self,
        rfp_id: &str,
        vendor_id: &str,
    ) -> Result<AwardOutcome, ComparisonError> {
        let (proposal, vendor) = self
            .proposals
            .find_by_pair(rfp_id, vendor_id)
            .await?
            .ok_or_else(|| ComparisonError::ProposalNotFound {
                rfp_id: rfp_id.to_string(),
                vendor_id: vendor_id.to_string(),
            })?;

        self.rfps.advance_status(rfp_id, RfpStatus::Awarded).await?;

        tracing::info!(rfp = %rfp_id, vendor = %vendor.id, "RFP awarded");

        Ok(AwardOutcome { proposal, vendor })
    }
}

/// Synthesize the evaluation for a single uncontested proposal
fn single_proposal_comparison(proposal: &Proposal, vendor: &Vendor) -> Comparison {
    Comparison {
        evaluations: vec![Evaluation {
            vendor_id: proposal.vendor_id.clone(),
            vendor_name: vendor.name.clone(),
            score: proposal.ai_score.unwrap_or(SINGLE_PROPOSAL_SCORE),
            strengths: vec!["Only proposal received".to_string()],
            weaknesses: vec!["No competition for comparison".to_string()],
            summary: "Single proposal received. Review terms before awarding.".to_string(),
        }],
        recommendation: Recommendation {
            recommended_vendor_id: proposal.vendor_id.clone(),
            recommended_vendor_name: vendor.name.clone(),
            reasoning: "Only one proposal received.".to_string(),
            comparison_matrix: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn proposal(score: Option<f64>) -> Proposal {
        Proposal {
            id: "p1".to_string(),
            rfp_id: "r1".to_string(),
            vendor_id: "v1".to_string(),
            raw_email: "Total Price: $27,250".to_string(),
            raw_subject: None,
            parsed_data: serde_json::json!({}),
            total_price: Some(27250.0),
            unit_prices: vec![],
            delivery_days: Some(25),
            warranty: None,
            payment_terms: None,
            ai_score: score,
            ai_summary: None,
            ai_strengths: vec![],
            ai_weaknesses: vec![],
            received_at: Utc::now(),
        }
    }

    fn vendor() -> Vendor {
        Vendor {
            id: "v1".to_string(),
            name: "TechSupply Co.".to_string(),
            email: "sales@techsupply.com".to_string(),
            contact_person: None,
            phone: None,
            address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_proposal_uses_default_score() {
        let comparison = single_proposal_comparison(&proposal(None), &vendor());

        assert_eq!(comparison.evaluations.len(), 1);
        assert_eq!(comparison.evaluations[0].score, 75.0);
        assert_eq!(comparison.recommendation.recommended_vendor_id, "v1");
        assert!(comparison.recommendation.comparison_matrix.is_none());
    }

    #[test]
    fn test_single_proposal_keeps_existing_score() {
        let comparison = single_proposal_comparison(&proposal(Some(88.0)), &vendor());
        assert_eq!(comparison.evaluations[0].score, 88.0);
    }

    #[test]
    fn test_comparison_deserializes_model_output() {
        let value = serde_json::json!({
            "evaluations": [{
                "vendorId": "v1",
                "vendorName": "TechSupply Co.",
                "score": 85,
                "strengths": ["Competitive pricing"],
                "weaknesses": ["Slightly higher price"],
                "summary": "Solid proposal."
            }],
            "recommendation": {
                "recommendedVendorId": "v1",
                "recommendedVendorName": "TechSupply Co.",
                "reasoning": "Best overall terms.",
                "comparisonMatrix": {
                    "headers": ["Factor", "TechSupply Co."],
                    "rows": [["Price", "$27,250"]]
                }
            }
        });

        let comparison: Comparison = serde_json::from_value(value).unwrap();
        assert_eq!(comparison.evaluations[0].score, 85.0);
        assert_eq!(
            comparison
                .recommendation
                .comparison_matrix
                .as_ref()
                .unwrap()
                .rows[0][0],
            "Price"
        );
    }
}
