//! Sender and RFP correlation helpers for inbound email

use std::sync::OnceLock;

use regex::Regex;

/// Extract the sender address from a raw From header, preferring the
/// bracketed `<addr>` form when present.
pub fn extract_sender_address(from: &str) -> String {
    static BRACKETED: OnceLock<Regex> = OnceLock::new();
    let re = BRACKETED.get_or_init(|| Regex::new(r"<([^>]+)>").expect("valid regex"));

    re.captures(from)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| from.trim().to_string())
}

/// Extract an explicit `RFP ID` marker from the subject, then the body.
pub fn extract_rfp_id(subject: Option<&str>, body: Option<&str>) -> Option<String> {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    let re = MARKER
        .get_or_init(|| Regex::new(r"(?i)RFP[:\s-]*ID[:\s-]*([a-f0-9-]+)").expect("valid regex"));

    for text in [subject, body].into_iter().flatten() {
        if let Some(captures) = re.captures(text) {
            return Some(captures[1].to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bracketed_sender() {
        assert_eq!(
            extract_sender_address("John Smith <sales@techsupply.com>"),
            "sales@techsupply.com"
        );
    }

    #[test]
    fn test_extract_bare_sender() {
        assert_eq!(
            extract_sender_address("sales@techsupply.com"),
            "sales@techsupply.com"
        );
        assert_eq!(
            extract_sender_address("  sales@techsupply.com  "),
            "sales@techsupply.com"
        );
    }

    #[test]
    fn test_extract_rfp_id_from_subject() {
        let id = extract_rfp_id(
            Some("Re: Request for Proposal - RFP ID: 5f6d7a2c-1b3e-4a5f-8c9d-0e1f2a3b4c5d"),
            None,
        );
        assert_eq!(id.as_deref(), Some("5f6d7a2c-1b3e-4a5f-8c9d-0e1f2a3b4c5d"));
    }

    #[test]
    fn test_extract_rfp_id_subject_wins_over_body() {
        let id = extract_rfp_id(
            Some("RFP ID: aaaa1111-0000-0000-0000-000000000000"),
            Some("RFP ID: bbbb2222-0000-0000-0000-000000000000"),
        );
        assert_eq!(id.as_deref(), Some("aaaa1111-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_extract_rfp_id_falls_back_to_body() {
        let id = extract_rfp_id(
            Some("Re: your request"),
            Some("Our quote follows.\n\n---\nRFP ID: cccc3333-0000-0000-0000-000000000000\n"),
        );
        assert_eq!(id.as_deref(), Some("cccc3333-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_extract_rfp_id_tolerates_separators() {
        let id = extract_rfp_id(Some("rfp-id - deadbeef-1234"), None);
        assert_eq!(id.as_deref(), Some("deadbeef-1234"));
    }

    #[test]
    fn test_extract_rfp_id_absent() {
        assert_eq!(extract_rfp_id(Some("Re: your request"), Some("No marker here")), None);
        assert_eq!(extract_rfp_id(None, None), None);
    }
}
