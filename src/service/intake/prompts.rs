//! Prompts for natural-language RFP extraction

/// System prompt for RFP intake
pub const INTAKE_SYSTEM_PROMPT: &str = r#"You are an assistant that converts natural language procurement requests into structured RFP (Request for Proposal) data.

Extract the requested fields and return ONLY valid JSON (no markdown, no code blocks):
- title: A concise title for the RFP
- description: Brief description of what is being procured
- budget: Total budget as a number (null if not specified)
- currency: Currency code (default "USD")
- deliveryDays: Number of days for delivery (null if not specified)
- paymentTerms: Payment terms as string (e.g., "Net 30")
- warrantyMonths: Warranty period in months (null if not specified)
- items: Array of items, each with:
  - name: Item name
  - description: Item description
  - quantity: Number of units
  - specifications: Object with key-value pairs for specs

Be precise with numbers. If something is not mentioned, use null.
Return ONLY the JSON object, no other text."#;

/// Build the intake prompt for a user request
pub fn build_intake_prompt(raw_input: &str) -> String {
    format!(
        r#"Convert this procurement request into structured RFP data.

User request:
---
{raw_input}
---

Return ONLY the JSON object, no other text:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_user_request() {
        let prompt = build_intake_prompt("Need 20 laptops with 16GB RAM");
        assert!(prompt.contains("Need 20 laptops with 16GB RAM"));
    }
}
