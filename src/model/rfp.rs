//! RFP domain types and lifecycle state machine

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle states of an RFP.
///
/// The lifecycle only ever moves forward: DRAFT → SENT → EVALUATING →
/// AWARDED. CLOSED is a terminal state reachable from any earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfpStatus {
    Draft,
    Sent,
    Evaluating,
    Awarded,
    Closed,
}

impl RfpStatus {
    fn rank(self) -> u8 {
        match self {
            RfpStatus::Draft => 0,
            RfpStatus::Sent => 1,
            RfpStatus::Evaluating => 2,
            RfpStatus::Awarded => 3,
            RfpStatus::Closed => 4,
        }
    }

    /// Whether moving to `next` keeps the lifecycle moving forward.
    pub fn advances_to(self, next: RfpStatus) -> bool {
        next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RfpStatus::Draft => "DRAFT",
            RfpStatus::Sent => "SENT",
            RfpStatus::Evaluating => "EVALUATING",
            RfpStatus::Awarded => "AWARDED",
            RfpStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(RfpStatus::Draft),
            "SENT" => Some(RfpStatus::Sent),
            "EVALUATING" => Some(RfpStatus::Evaluating),
            "AWARDED" => Some(RfpStatus::Awarded),
            "CLOSED" => Some(RfpStatus::Closed),
            _ => None,
        }
    }
}

/// Per-vendor delivery status of a dispatched RFP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStatus {
    Sent,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchStatus::Sent => "SENT",
            DispatchStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SENT" => Some(DispatchStatus::Sent),
            "FAILED" => Some(DispatchStatus::Failed),
            _ => None,
        }
    }
}

/// A Request for Proposal, owning an ordered set of items.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rfp {
    pub id: String,
    pub title: String,
    /// The original natural-language request the RFP was structured from.
    pub raw_input: String,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub currency: String,
    pub delivery_days: Option<i32>,
    pub payment_terms: Option<String>,
    pub warranty_months: Option<i32>,
    pub status: RfpStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<RfpItem>,
}

/// A line item of an RFP. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfpItem {
    pub id: String,
    pub rfp_id: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    /// Free-form specification mapping. BTreeMap keeps rendering
    /// deterministic for the dispatch template.
    pub specifications: BTreeMap<String, String>,
    pub position: i32,
}

/// Join record: an RFP was (attempted to be) sent to a vendor.
///
/// Unique per (rfp, vendor); re-sending updates the row in place.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfpVendor {
    pub rfp_id: String,
    pub vendor_id: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub status: DispatchStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_advances_forward() {
        assert!(RfpStatus::Draft.advances_to(RfpStatus::Sent));
        assert!(RfpStatus::Sent.advances_to(RfpStatus::Evaluating));
        assert!(RfpStatus::Evaluating.advances_to(RfpStatus::Awarded));
        assert!(RfpStatus::Draft.advances_to(RfpStatus::Awarded));

        assert!(!RfpStatus::Sent.advances_to(RfpStatus::Draft));
        assert!(!RfpStatus::Awarded.advances_to(RfpStatus::Evaluating));
        assert!(!RfpStatus::Sent.advances_to(RfpStatus::Sent));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            RfpStatus::Draft,
            RfpStatus::Sent,
            RfpStatus::Evaluating,
            RfpStatus::Awarded,
            RfpStatus::Closed,
        ] {
            assert_eq!(RfpStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RfpStatus::parse("PENDING"), None);
    }

    #[test]
    fn test_dispatch_status_round_trip() {
        assert_eq!(DispatchStatus::parse("SENT"), Some(DispatchStatus::Sent));
        assert_eq!(DispatchStatus::parse("FAILED"), Some(DispatchStatus::Failed));
        assert_eq!(DispatchStatus::parse("sent"), None);
    }
}
