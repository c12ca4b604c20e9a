//! Database row types and conversions to domain models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::model::{
    DispatchStatus, Proposal, Rfp, RfpItem, RfpStatus, RfpVendor, UnitPrice, Vendor,
};

/// Database representation of a vendor
#[derive(Debug, Clone, FromRow)]
pub struct VendorRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorRow {
    pub fn into_domain(self) -> Vendor {
        Vendor {
            id: self.id,
            name: self.name,
            email: self.email,
            contact_person: self.contact_person,
            phone: self.phone,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database representation of an RFP (items are loaded separately)
#[derive(Debug, Clone, FromRow)]
pub struct RfpRow {
    pub id: String,
    pub title: String,
    pub raw_input: String,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub currency: String,
    pub delivery_days: Option<i32>,
    pub payment_terms: Option<String>,
    pub warranty_months: Option<i32>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RfpRow {
    /// Convert database row to domain model, attaching its items
    pub fn into_domain(self, items: Vec<RfpItem>) -> Result<Rfp, String> {
        let status = RfpStatus::parse(&self.status)
            .ok_or_else(|| format!("Unknown RFP status: {}", self.status))?;

        Ok(Rfp {
            id: self.id,
            title: self.title,
            raw_input: self.raw_input,
            description: self.description,
            budget: self.budget,
            currency: self.currency,
            delivery_days: self.delivery_days,
            payment_terms: self.payment_terms,
            warranty_months: self.warranty_months,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

/// Database representation of an RFP line item
#[derive(Debug, Clone, FromRow)]
pub struct RfpItemRow {
    pub id: String,
    pub rfp_id: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub specifications: serde_json::Value,
    pub position: i32,
}

impl RfpItemRow {
    pub fn into_domain(self) -> RfpItem {
        let specifications: BTreeMap<String, String> =
            serde_json::from_value(self.specifications).unwrap_or_default();

        RfpItem {
            id: self.id,
            rfp_id: self.rfp_id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            specifications,
            position: self.position,
        }
    }
}

/// Database representation of a dispatch record
#[derive(Debug, Clone, FromRow)]
pub struct RfpVendorRow {
    pub rfp_id: String,
    pub vendor_id: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl RfpVendorRow {
    pub fn into_domain(self) -> Result<RfpVendor, String> {
        let status = DispatchStatus::parse(&self.status)
            .ok_or_else(|| format!("Unknown dispatch status: {}", self.status))?;

        Ok(RfpVendor {
            rfp_id: self.rfp_id,
            vendor_id: self.vendor_id,
            sent_at: self.sent_at,
            status,
        })
    }
}

/// Database representation of a proposal
#[derive(Debug, Clone, FromRow)]
pub struct ProposalRow {
    pub id: String,
    pub rfp_id: String,
    pub vendor_id: String,
    pub raw_email: String,
    pub raw_subject: Option<String>,
    pub parsed_data: serde_json::Value,
    pub total_price: Option<f64>,
    pub unit_prices: serde_json::Value,
    pub delivery_days: Option<i32>,
    pub warranty: Option<String>,
    pub payment_terms: Option<String>,
    pub ai_score: Option<f64>,
    pub ai_summary: Option<String>,
    pub ai_strengths: serde_json::Value,
    pub ai_weaknesses: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl ProposalRow {
    pub fn into_domain(self) -> Proposal {
        let unit_prices: Vec<UnitPrice> =
            serde_json::from_value(self.unit_prices).unwrap_or_default();
        let ai_strengths: Vec<String> =
            serde_json::from_value(self.ai_strengths).unwrap_or_default();
        let ai_weaknesses: Vec<String> =
            serde_json::from_value(self.ai_weaknesses).unwrap_or_default();

        Proposal {
            id: self.id,
            rfp_id: self.rfp_id,
            vendor_id: self.vendor_id,
            raw_email: self.raw_email,
            raw_subject: self.raw_subject,
            parsed_data: self.parsed_data,
            total_price: self.total_price,
            unit_prices,
            delivery_days: self.delivery_days,
            warranty: self.warranty,
            payment_terms: self.payment_terms,
            ai_score: self.ai_score,
            ai_summary: self.ai_summary,
            ai_strengths,
            ai_weaknesses,
            received_at: self.received_at,
        }
    }
}

/// Relation counts attached to directory and RFP listings
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationCounts {
    pub proposals: i64,
    pub rfp_vendors: i64,
}
