//! Prompts for vendor email extraction

use crate::model::Rfp;

/// System prompt for proposal extraction
pub const PROPOSAL_SYSTEM_PROMPT: &str = r#"You are an assistant that extracts structured proposal data from vendor email responses.

Extract the requested fields and return ONLY valid JSON (no markdown, no code blocks):
- totalPrice: Total quoted price as a number (null if not clear)
- unitPrices: Array of {itemName, unitPrice, quantity, totalPrice} for each quoted item
- deliveryDays: Proposed delivery timeline in days (null if not specified)
- warranty: Warranty terms as string
- paymentTerms: Payment terms as string
- additionalNotes: Any other important terms or conditions
- isComplete: Boolean - does the response address all RFP requirements?

Be precise with numbers. Extract exactly what is stated.
Return ONLY the JSON object, no other text."#;

/// Build the proposal-extraction prompt from the email body and RFP context
pub fn build_proposal_prompt(rfp: &Rfp, email_content: &str) -> String {
    let items: Vec<serde_json::Value> = rfp
        .items
        .iter()
        .map(|item| {
            serde_json::json!({
                "name": item.name,
                "quantity": item.quantity,
                "specifications": item.specifications,
            })
        })
        .collect();

    let context = serde_json::json!({
        "title": rfp.title,
        "budget": rfp.budget,
        "items": items,
        "deliveryDays": rfp.delivery_days,
        "paymentTerms": rfp.payment_terms,
        "warrantyMonths": rfp.warranty_months,
    });

    let context = serde_json::to_string_pretty(&context).unwrap_or_default();

    format!(
        r#"The original RFP requested:
{context}

Extract the proposal data from the vendor's email.

Vendor email content:
---
{email_content}
---

Return ONLY the JSON object, no other text:"#
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::RfpStatus;

    #[test]
    fn test_prompt_includes_context_and_email() {
        let rfp = Rfp {
            id: "r1".to_string(),
            title: "Office IT Equipment Procurement".to_string(),
            raw_input: "laptops".to_string(),
            description: None,
            budget: Some(50000.0),
            currency: "USD".to_string(),
            delivery_days: Some(30),
            payment_terms: None,
            warranty_months: None,
            status: RfpStatus::Sent,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![],
        };

        let prompt = build_proposal_prompt(&rfp, "Total Price: $27,250");

        assert!(prompt.contains("Office IT Equipment Procurement"));
        assert!(prompt.contains("50000"));
        assert!(prompt.contains("Total Price: $27,250"));
    }
}
