//! Heuristic scoring of generated persona summaries.
//!
//! Every check is evaluated for every summary; a check whose precondition
//! does not hold (e.g. low architecture interest) fails instead of being
//! skipped, so the denominator is always `CHECKS.len()`.

use serde::Serialize;

use crate::persona::attributes::{InterestLevel, VisitorAttributes};

/// Default minimum confidence for acceptance.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

type Check = fn(&VisitorAttributes, &str) -> bool;

/// Named checks against the lower-cased summary.
const CHECKS: [(&str, Check); 7] = [
    ("age_group", |attrs, text| {
        contains_label(text, &attrs.age_group.replacen('-', " ", 1))
    }),
    ("visit_purpose", |attrs, text| {
        contains_label(text, attrs.visit_purpose.as_str())
    }),
    ("interest_architecture", |attrs, text| {
        attrs.interest_architecture == InterestLevel::High && text.contains("architecture")
    }),
    ("interest_history", |attrs, text| {
        attrs.interest_history == InterestLevel::High && text.contains("history")
    }),
    ("interest_spirituality", |attrs, text| {
        attrs.interest_spirituality == InterestLevel::High && text.contains("spiritual")
    }),
    ("language_level", |attrs, text| {
        contains_label(text, attrs.language_level.as_str())
    }),
    ("first_visit", |attrs, text| {
        !attrs.visited_before && text.contains("first")
    }),
];

// Unlike a plain substring test, an empty label scores nothing.
fn contains_label(text: &str, label: &str) -> bool {
    let label = label.trim().to_lowercase();
    !label.is_empty() && text.contains(&label)
}

/// Score of one summary against the attributes it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// `score / total_checks`, always in `[0, 1]`.
    pub confidence: f64,
    pub passed: bool,
    pub score: usize,
    pub total_checks: usize,
    pub failed_checks: Vec<&'static str>,
}

/// Deterministic validator with a configurable acceptance threshold.
#[derive(Debug, Clone, Copy)]
pub struct PersonaValidator {
    threshold: f64,
}

impl Default for PersonaValidator {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl PersonaValidator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn validate(&self, attrs: &VisitorAttributes, summary: &str) -> ValidationResult {
        let text = summary.to_lowercase();
        let mut failed_checks = Vec::new();
        for (name, check) in CHECKS {
            if !check(attrs, &text) {
                failed_checks.push(name);
            }
        }

        let total_checks = CHECKS.len();
        let score = total_checks - failed_checks.len();
        let confidence = score as f64 / total_checks as f64;

        ValidationResult {
            confidence,
            passed: confidence >= self.threshold,
            score,
            total_checks,
            failed_checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::persona::attributes::{LanguageLevel, VisitPurpose};
    use crate::persona::normalize::{RawVisitorInput, normalize};

    fn scenario_attrs() -> VisitorAttributes {
        let raw: RawVisitorInput = serde_json::from_value(json!({
            "age_group": "19-25",
            "visit_purpose": "Tourism",
            "interest_architecture": 1,
            "interest_history": 0,
            "interest_spirituality": 0,
            "interest_art": 0,
            "language_level": "Simple",
            "visited_before": false,
        }))
        .unwrap();
        normalize(raw)
    }

    fn enthusiast() -> VisitorAttributes {
        VisitorAttributes {
            age_group: "26-40".to_string(),
            visit_purpose: VisitPurpose::Religious,
            language_level: LanguageLevel::Advanced,
            interest_architecture: InterestLevel::High,
            interest_history: InterestLevel::High,
            interest_spirituality: InterestLevel::High,
            visited_before: false,
            ..Default::default()
        }
    }

    #[test]
    fn scenario_summary_scores_five_of_seven() {
        let attrs = scenario_attrs();
        let summary = "A 19 25 year old tourism visitor drawn to architecture, \
                       preferring simple language on their first visit.";
        let result = PersonaValidator::default().validate(&attrs, summary);

        assert_eq!(result.score, 5);
        assert_eq!(result.total_checks, 7);
        assert!((result.confidence - 5.0 / 7.0).abs() < 1e-12);
        assert!(result.passed);
        assert_eq!(
            result.failed_checks,
            vec!["interest_history", "interest_spirituality"]
        );
    }

    #[test]
    fn unrelated_summary_scores_zero() {
        let result =
            PersonaValidator::default().validate(&scenario_attrs(), "A visitor to the museum.");
        assert_eq!(result.score, 0);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.passed);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let result = PersonaValidator::default().validate(
            &scenario_attrs(),
            "TOURISM and ARCHITECTURE, a FIRST visit in SIMPLE terms, aged 19 25.",
        );
        assert_eq!(result.score, 5);
    }

    #[test]
    fn architecture_check_contributes_one_seventh() {
        let attrs = enthusiast();
        let validator = PersonaValidator::default();
        let without = validator.validate(&attrs, "religious advanced");
        let with = validator.validate(&attrs, "religious advanced architecture");
        assert!((with.confidence - without.confidence - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn low_interest_fails_instead_of_being_skipped() {
        let attrs = VisitorAttributes {
            interest_architecture: InterestLevel::Low,
            ..enthusiast()
        };
        let result = PersonaValidator::default().validate(&attrs, "architecture");
        assert_eq!(result.total_checks, 7);
        assert!(result.failed_checks.contains(&"interest_architecture"));
    }

    #[test]
    fn returning_visitor_fails_first_visit_check() {
        let attrs = VisitorAttributes {
            visited_before: true,
            ..enthusiast()
        };
        let result = PersonaValidator::default().validate(&attrs, "their first return");
        assert!(result.failed_checks.contains(&"first_visit"));
    }

    #[test]
    fn empty_labels_never_match() {
        let attrs = VisitorAttributes::default();
        let result = PersonaValidator::default().validate(&attrs, "anything at all");
        assert!(result.failed_checks.contains(&"age_group"));
        assert!(result.failed_checks.contains(&"visit_purpose"));
        assert!(result.failed_checks.contains(&"language_level"));
    }

    #[test]
    fn only_first_hyphen_is_replaced() {
        let attrs = VisitorAttributes {
            age_group: "60-70-plus".to_string(),
            ..Default::default()
        };
        let result = PersonaValidator::default().validate(&attrs, "aged 60 70-plus");
        assert!(!result.failed_checks.contains(&"age_group"));
    }

    #[test]
    fn pass_boundary_is_five_checks() {
        let attrs = enthusiast();
        let validator = PersonaValidator::default();

        // age, purpose, language, architecture, first
        let five = validator.validate(&attrs, "26 40 religious advanced architecture first");
        assert_eq!(five.score, 5);
        assert!(five.passed);

        let four = validator.validate(&attrs, "26 40 religious advanced architecture");
        assert_eq!(four.score, 4);
        assert!(!four.passed);
    }

    #[test]
    fn confidence_is_always_a_multiple_of_one_seventh() {
        let attrs = enthusiast();
        let words = [
            "26 40",
            "religious",
            "architecture",
            "history",
            "spiritual",
            "advanced",
            "first",
        ];
        let validator = PersonaValidator::default();
        for mask in 0u32..(1 << words.len()) {
            let summary: Vec<&str> = words
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, w)| *w)
                .collect();
            let result = validator.validate(&attrs, &summary.join(" "));
            let sevenths = result.confidence * 7.0;
            assert!((sevenths - sevenths.round()).abs() < 1e-9);
            assert!((0.0..=1.0).contains(&result.confidence));
            assert_eq!(result.score, mask.count_ones() as usize);
            assert_eq!(result.passed, result.score >= 5);
        }
    }

    #[test]
    fn custom_threshold_is_honored() {
        let strict = PersonaValidator::new(1.0);
        let result = strict.validate(
            &scenario_attrs(),
            "19 25 tourism architecture simple first",
        );
        assert_eq!(result.score, 5);
        assert!(!result.passed);
    }
}
