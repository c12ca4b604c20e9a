//! Validation logic for LLM-produced comparisons
//!
//! Ensures evaluations stay within the scoring range and refer to vendors
//! that actually submitted a proposal for the RFP.

use std::collections::HashSet;

use super::Comparison;

/// Result of comparison validation
#[derive(Debug)]
pub struct ComparisonValidationResult {
    /// Whether the comparison passed validation
    pub is_valid: bool,
    /// Critical errors that indicate invalid output
    pub errors: Vec<String>,
    /// Warnings that indicate potential quality issues
    pub warnings: Vec<String>,
}

impl ComparisonValidationResult {
    /// Create a new validation result with no issues
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the validation result
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the validation result
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Validate a comparison against the set of vendors that submitted
/// proposals.
///
/// Checks:
/// 1. At least one evaluation is present
/// 2. Every score lies within 0-100
/// 3. Every evaluation refers to a vendor with a proposal
/// 4. The recommended vendor has a proposal (warning otherwise)
pub fn validate_comparison(
    comparison: &Comparison,
    known_vendor_ids: &HashSet<String>,
) -> ComparisonValidationResult {
    let mut result = ComparisonValidationResult::valid();

    if comparison.evaluations.is_empty() {
        result.add_error("Comparison contains no evaluations".to_string());
        return result;
    }

    for (i, evaluation) in comparison.evaluations.iter().enumerate() {
        if !(0.0..=100.0).contains(&evaluation.score) {
            result.add_error(format!(
                "Evaluation {} score {} outside 0-100",
                i + 1,
                evaluation.score
            ));
        }

        if !known_vendor_ids.contains(&evaluation.vendor_id) {
            result.add_error(format!(
                "Evaluation {} refers to unknown vendor '{}'",
                i + 1,
                evaluation.vendor_id
            ));
        }

        if evaluation.summary.trim().is_empty() {
            result.add_warning(format!("Evaluation {} has an empty summary", i + 1));
        }
    }

    if !known_vendor_ids.contains(&comparison.recommendation.recommended_vendor_id) {
        result.add_warning(format!(
            "Recommended vendor '{}' has no proposal for this RFP",
            comparison.recommendation.recommended_vendor_id
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::comparison::{Evaluation, Recommendation};

    fn comparison(score: f64, vendor_id: &str) -> Comparison {
        Comparison {
            evaluations: vec![Evaluation {
                vendor_id: vendor_id.to_string(),
                vendor_name: "TechSupply Co.".to_string(),
                score,
                strengths: vec!["Competitive pricing".to_string()],
                weaknesses: vec!["Limited support".to_string()],
                summary: "Solid proposal at a fair price.".to_string(),
            }],
            recommendation: Recommendation {
                recommended_vendor_id: vendor_id.to_string(),
                recommended_vendor_name: "TechSupply Co.".to_string(),
                reasoning: "Best combination of price and delivery.".to_string(),
                comparison_matrix: None,
            },
        }
    }

    fn known(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_valid_comparison() {
        let result = validate_comparison(&comparison(85.0, "v1"), &known(&["v1"]));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_score_out_of_range() {
        let result = validate_comparison(&comparison(140.0, "v1"), &known(&["v1"]));
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("outside 0-100"));
    }

    #[test]
    fn test_unknown_vendor_is_an_error() {
        let result = validate_comparison(&comparison(85.0, "v9"), &known(&["v1"]));
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("unknown vendor")));
    }

    #[test]
    fn test_empty_evaluations_is_an_error() {
        let mut c = comparison(85.0, "v1");
        c.evaluations.clear();
        let result = validate_comparison(&c, &known(&["v1"]));
        assert!(!result.is_valid);
    }

    #[test]
    fn test_unknown_recommendation_is_a_warning() {
        let mut c = comparison(85.0, "v1");
        c.recommendation.recommended_vendor_id = "v9".to_string();
        let result = validate_comparison(&c, &known(&["v1"]));
        assert!(result.is_valid);
        assert!(!result.warnings.is_empty());
    }
}
