//! Natural-language RFP intake
//!
//! Structures a free-text procurement request through the extraction seam
//! and persists the resulting RFP with its items in one transaction.

pub mod prompts;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::repository::RfpRepository;
use crate::db::DbError;
use crate::model::{Rfp, RfpItem, RfpStatus};
use crate::service::llm::{ExtractError, StructuredExtractor, DEFAULT_MODEL};
use self::prompts::{build_intake_prompt, INTAKE_SYSTEM_PROMPT};

/// Minimum length of a usable natural-language request
const MIN_INPUT_LEN: usize = 10;

/// Environment variable for the intake model (defaults to the shared model)
const ENV_INTAKE_MODEL: &str = "RFPFLOW_INTAKE_MODEL";

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Please provide more details")]
    InputTooShort,

    #[error("RFP extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Shape the extractor is asked to return for an RFP
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRfp {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub delivery_days: Option<i32>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub warranty_months: Option<i32>,
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
}

/// A single extracted line item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub specifications: Option<BTreeMap<String, serde_json::Value>>,
}

/// Service for creating RFPs from natural language
pub struct IntakeService {
    extractor: Arc<dyn StructuredExtractor>,
    rfps: RfpRepository,
    model: String,
}

impl IntakeService {
    pub fn new(extractor: Arc<dyn StructuredExtractor>, rfps: RfpRepository) -> Self {
        let model = std::env::var(ENV_INTAKE_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            extractor,
            rfps,
            model,
        }
    }

    /// Create an RFP from a natural-language request.
    ///
    /// Returns the persisted RFP with status DRAFT and its items; the RFP
    /// and items are written atomically, so a partially-persisted RFP
    /// without items cannot be observed.
    pub async fn create_from_text(&self, raw_input: &str) -> Result<Rfp, IntakeError> {
        if raw_input.trim().chars().count() < MIN_INPUT_LEN {
            return Err(IntakeError::InputTooShort);
        }

        let prompt = build_intake_prompt(raw_input);
        let value = self
            .extractor
            .extract(&self.model, INTAKE_SYSTEM_PROMPT, &prompt)
            .await?;

        let extracted: ExtractedRfp = serde_json::from_value(value)
            .map_err(|e| IntakeError::Extraction(ExtractError::Malformed(e.to_string())))?;

        let rfp = build_rfp(raw_input, extracted);
        self.rfps.create_with_items(&rfp).await?;

        tracing::info!(rfp = %rfp.id, items = rfp.items.len(), "RFP created from natural language");
        Ok(rfp)
    }
}

/// Assemble the domain RFP from the extraction output
fn build_rfp(raw_input: &str, extracted: ExtractedRfp) -> Rfp {
    let now = Utc::now();
    let rfp_id = Uuid::new_v4().to_string();

    let items = extracted
        .items
        .into_iter()
        .enumerate()
        .map(|(position, item)| RfpItem {
            id: Uuid::new_v4().to_string(),
            rfp_id: rfp_id.clone(),
            name: item.name,
            description: item.description,
            quantity: item.quantity.unwrap_or(1),
            specifications: stringify_specifications(item.specifications.unwrap_or_default()),
            position: position as i32,
        })
        .collect();

    Rfp {
        id: rfp_id,
        title: extracted.title,
        raw_input: raw_input.to_string(),
        description: extracted.description,
        budget: extracted.budget,
        currency: extracted.currency.unwrap_or_else(|| "USD".to_string()),
        delivery_days: extracted.delivery_days,
        payment_terms: extracted.payment_terms,
        warranty_months: extracted.warranty_months,
        status: RfpStatus::Draft,
        created_at: now,
        updated_at: now,
        items,
    }
}

/// Coerce specification values to strings. Models occasionally return
/// numbers or booleans where the schema asks for strings.
fn stringify_specifications(
    specifications: BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, String> {
    specifications
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(items: Vec<ExtractedItem>) -> ExtractedRfp {
        ExtractedRfp {
            title: "Office IT Equipment Procurement".to_string(),
            description: Some("Laptops for the new office".to_string()),
            budget: Some(50000.0),
            currency: None,
            delivery_days: Some(30),
            payment_terms: Some("Net 30".to_string()),
            warranty_months: None,
            items,
        }
    }

    #[test]
    fn test_build_rfp_defaults() {
        let rfp = build_rfp(
            "Need 20 laptops with 16GB RAM, budget $50,000, 30 day delivery",
            extracted(vec![ExtractedItem {
                name: "Business Laptop".to_string(),
                description: None,
                quantity: None,
                specifications: None,
            }]),
        );

        assert_eq!(rfp.status, RfpStatus::Draft);
        assert_eq!(rfp.currency, "USD");
        assert_eq!(rfp.budget, Some(50000.0));
        assert_eq!(rfp.items.len(), 1);
        assert_eq!(rfp.items[0].quantity, 1);
        assert!(rfp.items[0].specifications.is_empty());
        assert_eq!(rfp.items[0].rfp_id, rfp.id);
    }

    #[test]
    fn test_build_rfp_preserves_item_order() {
        let items = vec![
            ExtractedItem {
                name: "Laptop".to_string(),
                description: None,
                quantity: Some(20),
                specifications: None,
            },
            ExtractedItem {
                name: "Monitor".to_string(),
                description: None,
                quantity: Some(15),
                specifications: None,
            },
        ];

        let rfp = build_rfp("Laptops and monitors for the office", extracted(items));

        assert_eq!(rfp.items[0].name, "Laptop");
        assert_eq!(rfp.items[0].position, 0);
        assert_eq!(rfp.items[1].name, "Monitor");
        assert_eq!(rfp.items[1].position, 1);
    }

    #[test]
    fn test_stringify_specifications_coerces_non_strings() {
        let mut specs = BTreeMap::new();
        specs.insert("RAM".to_string(), serde_json::json!("16GB"));
        specs.insert("Cores".to_string(), serde_json::json!(8));

        let result = stringify_specifications(specs);

        assert_eq!(result["RAM"], "16GB");
        assert_eq!(result["Cores"], "8");
    }
}
