//! Proposal domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A vendor's structured response to an RFP.
///
/// At most one proposal exists per (rfp, vendor); a later submission from
/// the same vendor overwrites the earlier one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub rfp_id: String,
    pub vendor_id: String,
    /// The raw email body the proposal was extracted from.
    pub raw_email: String,
    pub raw_subject: Option<String>,
    /// The extraction output retained verbatim, whatever shape the model
    /// returned.
    pub parsed_data: serde_json::Value,
    pub total_price: Option<f64>,
    pub unit_prices: Vec<UnitPrice>,
    pub delivery_days: Option<i32>,
    pub warranty: Option<String>,
    pub payment_terms: Option<String>,
    pub ai_score: Option<f64>,
    pub ai_summary: Option<String>,
    pub ai_strengths: Vec<String>,
    pub ai_weaknesses: Vec<String>,
    pub received_at: DateTime<Utc>,
}

/// A quoted line item within a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitPrice {
    #[serde(default)]
    pub item_name: String,
    pub unit_price: Option<f64>,
    pub quantity: Option<i32>,
    pub total_price: Option<f64>,
}
