//! Prompts for proposal comparison

use crate::model::{Proposal, Rfp, Vendor};

/// System prompt for proposal comparison
pub const COMPARISON_SYSTEM_PROMPT: &str = r#"You are an assistant that evaluates and compares vendor proposals for an RFP.

Analyze each proposal and provide:
1. A score from 0-100 for each proposal based on:
   - Price competitiveness (40%)
   - Meeting RFP requirements (30%)
   - Delivery timeline (15%)
   - Warranty and terms (15%)
2. For each proposal, identify strengths, weaknesses, and a summary.
3. Provide an overall recommendation.

Return ONLY valid JSON (no markdown, no code blocks) in this format:
{
  "evaluations": [
    {
      "vendorId": "...",
      "vendorName": "...",
      "score": 85,
      "strengths": ["..."],
      "weaknesses": ["..."],
      "summary": "..."
    }
  ],
  "recommendation": {
    "recommendedVendorId": "...",
    "recommendedVendorName": "...",
    "reasoning": "...",
    "comparisonMatrix": {
      "headers": ["Factor", "Vendor1", "Vendor2"],
      "rows": [["Price", "$X", "$Y"]]
    }
  }
}

Return ONLY the JSON object, no other text."#;

/// Build the comparison prompt from the RFP and its proposals
pub fn build_comparison_prompt(rfp: &Rfp, proposals: &[(Proposal, Vendor)]) -> String {
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

    let proposal_projection: Vec<serde_json::Value> = proposals
        .iter()
        .map(|(proposal, vendor)| {
            serde_json::json!({
                "vendorId": proposal.vendor_id,
                "vendorName": vendor.name,
                "totalPrice": proposal.total_price,
                "deliveryDays": proposal.delivery_days,
                "warranty": proposal.warranty,
                "paymentTerms": proposal.payment_terms,
                "unitPrices": proposal.unit_prices,
                "parsedData": proposal.parsed_data,
            })
        })
        .collect();

    let context = serde_json::json!({
        "rfp": {
            "title": rfp.title,
            "budget": rfp.budget,
            "deliveryDays": rfp.delivery_days,
            "items": items,
            "paymentTerms": rfp.payment_terms,
            "warrantyMonths": rfp.warranty_months,
        },
        "proposals": proposal_projection,
    });

    let context = serde_json::to_string_pretty(&context).unwrap_or_default();

    format!(
        r#"RFP and Proposals data:
{context}

Evaluate every proposal and produce the comparison.

Return ONLY the JSON object, no other text:"#
    )
}
