//! Vendor directory types and email-address matching

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A vendor contact record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    /// Unique across the directory; the inbound matcher resolves senders
    /// against this column.
    pub email: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial update to a vendor record. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Normalize an email address for comparison: trim and lowercase.
pub fn normalize_email(addr: &str) -> String {
    addr.trim().to_lowercase()
}

/// The single containment predicate the inbound matcher uses to resolve a
/// sender address against a directory entry: case-insensitive, matching
/// when the directory email contains the candidate address.
pub fn email_matches(candidate: &str, vendor_email: &str) -> bool {
    let candidate = normalize_email(candidate);
    if candidate.is_empty() {
        return false;
    }
    normalize_email(vendor_email).contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert!(email_matches("Sales@TechSupply.com", "sales@techsupply.com"));
        assert!(email_matches("sales@techsupply.com", "SALES@TECHSUPPLY.COM"));
    }

    #[test]
    fn test_containment_match() {
        // Directory entries occasionally carry a display form around the
        // address; containment still resolves the sender.
        assert!(email_matches("quotes@officeworld.com", "rfp+quotes@officeworld.com"));
    }

    #[test]
    fn test_no_match() {
        assert!(!email_matches("sales@techsupply.com", "quotes@officeworld.com"));
    }

    #[test]
    fn test_empty_candidate_never_matches() {
        assert!(!email_matches("", "sales@techsupply.com"));
        assert!(!email_matches("   ", "sales@techsupply.com"));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert!(email_matches("  sales@techsupply.com ", "sales@techsupply.com"));
    }
}
