//! Deterministic rendering of the RFP notification email

use crate::model::{Rfp, Vendor};

/// Subject line for an RFP notification
pub fn render_subject(rfp: &Rfp) -> String {
    format!("Request for Proposal: {}", rfp.title)
}

/// Render the notification body.
///
/// Requirement lines are included only when the corresponding RFP field is
/// set. The trailing `RFP ID:` marker line is machine-readable; inbound
/// replies are correlated back to the RFP through it.
pub fn render_body(rfp: &Rfp, vendor: &Vendor) -> String {
    let recipient = vendor.contact_person.as_deref().unwrap_or(&vendor.name);

    let mut body = format!(
        "Dear {recipient},\n\n\
         We are requesting a proposal for the following procurement:\n\n\
         **{title}**\n",
        title = rfp.title
    );

    if let Some(description) = rfp.description.as_deref() {
        body.push('\n');
        body.push_str(description);
        body.push('\n');
    }

    body.push_str("\n**Items Required:**\n");
    for item in &rfp.items {
        body.push_str(&format!("\u{2022} {} (Qty: {})", item.name, item.quantity));
        if let Some(description) = item.description.as_deref() {
            body.push_str(&format!(" - {description}"));
        }
        body.push('\n');
    }

    let specs: Vec<String> = rfp
        .items
        .iter()
        .filter(|item| !item.specifications.is_empty())
        .map(|item| {
            let lines: Vec<String> = item
                .specifications
                .iter()
                .map(|(key, value)| format!("  - {key}: {value}"))
                .collect();
            format!("{}:\n{}", item.name, lines.join("\n"))
        })
        .collect();

    if !specs.is_empty() {
        body.push_str("\n**Specifications:**\n");
        body.push_str(&specs.join("\n\n"));
        body.push('\n');
    }

    body.push_str("\n**Requirements:**\n");
    if let Some(budget) = rfp.budget {
        body.push_str(&format!(
            "\u{2022} Budget: ${} {}\n",
            format_amount(budget),
            rfp.currency
        ));
    }
    if let Some(delivery_days) = rfp.delivery_days {
        body.push_str(&format!("\u{2022} Delivery: Within {delivery_days} days\n"));
    }
    if let Some(payment_terms) = rfp.payment_terms.as_deref() {
        body.push_str(&format!("\u{2022} Payment Terms: {payment_terms}\n"));
    }
    if let Some(warranty_months) = rfp.warranty_months {
        body.push_str(&format!(
            "\u{2022} Warranty Required: {warranty_months} months minimum\n"
        ));
    }

    body.push_str(
        "\nPlease reply to this email with your proposal including:\n\
         1. Unit prices for each item\n\
         2. Total price\n\
         3. Delivery timeline\n\
         4. Warranty terms\n\
         5. Payment terms\n\n\
         Best regards,\n\
         Procurement Team\n\n\
         ---\n",
    );
    body.push_str(&format!("RFP ID: {}\n", rfp.id));

    body
}

/// Format a monetary amount with thousands separators, dropping a zero
/// fractional part
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let amount = amount.abs();

    let integer = amount.trunc() as u64;
    let fraction = ((amount - amount.trunc()) * 100.0).round() as u64;

    let digits = integer.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut result = String::new();
    if negative {
        result.push('-');
    }
    result.push_str(&grouped);
    if fraction > 0 {
        result.push_str(&format!(".{:02}", fraction));
    }

    result
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::model::{RfpItem, RfpStatus};

    fn vendor() -> Vendor {
        Vendor {
            id: "v1".to_string(),
            name: "TechSupply Co.".to_string(),
            email: "sales@techsupply.com".to_string(),
            contact_person: Some("John Smith".to_string()),
            phone: None,
            address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rfp() -> Rfp {
        let mut specifications = BTreeMap::new();
        specifications.insert("RAM".to_string(), "16GB".to_string());
        specifications.insert("Storage".to_string(), "512GB SSD".to_string());

        Rfp {
            id: "5f6d7a2c-1b3e-4a5f-8c9d-0e1f2a3b4c5d".to_string(),
            title: "Office IT Equipment Procurement".to_string(),
            raw_input: "Need 20 laptops".to_string(),
            description: Some("Laptops for the new office".to_string()),
            budget: Some(50000.0),
            currency: "USD".to_string(),
            delivery_days: Some(30),
            payment_terms: Some("Net 30".to_string()),
            warranty_months: Some(12),
            status: RfpStatus::Draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![RfpItem {
                id: "i1".to_string(),
                rfp_id: "5f6d7a2c-1b3e-4a5f-8c9d-0e1f2a3b4c5d".to_string(),
                name: "Business Laptop".to_string(),
                description: Some("High-performance laptop".to_string()),
                quantity: 20,
                specifications,
                position: 0,
            }],
        }
    }

    #[test]
    fn test_body_contains_marker_line() {
        let body = render_body(&rfp(), &vendor());
        assert!(body.ends_with("RFP ID: 5f6d7a2c-1b3e-4a5f-8c9d-0e1f2a3b4c5d\n"));
    }

    #[test]
    fn test_body_greets_contact_person() {
        let body = render_body(&rfp(), &vendor());
        assert!(body.starts_with("Dear John Smith,"));
    }

    #[test]
    fn test_body_falls_back_to_vendor_name() {
        let mut vendor = vendor();
        vendor.contact_person = None;
        let body = render_body(&rfp(), &vendor);
        assert!(body.starts_with("Dear TechSupply Co.,"));
    }

    #[test]
    fn test_requirement_lines_follow_field_presence() {
        let body = render_body(&rfp(), &vendor());
        assert!(body.contains("\u{2022} Budget: $50,000 USD"));
        assert!(body.contains("\u{2022} Delivery: Within 30 days"));
        assert!(body.contains("\u{2022} Payment Terms: Net 30"));
        assert!(body.contains("\u{2022} Warranty Required: 12 months minimum"));

        let mut bare = rfp();
        bare.budget = None;
        bare.delivery_days = None;
        bare.payment_terms = None;
        bare.warranty_months = None;
        let body = render_body(&bare, &vendor());
        assert!(!body.contains("Budget:"));
        assert!(!body.contains("Delivery:"));
        assert!(!body.contains("Payment Terms:"));
        assert!(!body.contains("Warranty Required:"));
    }

    #[test]
    fn test_specifications_block_renders_per_item() {
        let body = render_body(&rfp(), &vendor());
        assert!(body.contains("**Specifications:**"));
        assert!(body.contains("Business Laptop:"));
        assert!(body.contains("  - RAM: 16GB"));

        let mut without_specs = rfp();
        without_specs.items[0].specifications.clear();
        let body = render_body(&without_specs, &vendor());
        assert!(!body.contains("**Specifications:**"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let body_a = render_body(&rfp(), &vendor());
        let body_b = render_body(&rfp(), &vendor());
        assert_eq!(body_a, body_b);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(50000.0), "50,000");
        assert_eq!(format_amount(1234567.0), "1,234,567");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(27250.5), "27,250.50");
    }
}
