//! Mapping of raw, possibly legacy, visitor payloads onto canonical attributes.
//!
//! Normalization never fails. Values outside the synonym table pass through
//! unchanged, except the interest fields: they are re-encoded from the raw
//! form, and only the integer `1` counts as interest. An already-canonical
//! `"High"` therefore degrades to `Low` when normalized again.
// TODO: decide with the kiosk team whether "High"/"Medium" strings should be
// accepted as interest too; that would make normalization idempotent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persona::attributes::{
    ArtInterest, BuddhistKnowledge, ExplanationType, InterestLevel, LanguageLevel,
    TimelineDirection, VisitPurpose, VisitorAttributes,
};

/// Untyped visitor payload as posted by the kiosk and QR clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVisitorInput {
    #[serde(default)]
    pub age_group: Option<Value>,
    #[serde(default)]
    pub time_budget: Option<Value>,
    #[serde(default)]
    pub visit_purpose: Option<Value>,
    #[serde(default)]
    pub language_level: Option<Value>,
    #[serde(default)]
    pub interest_architecture: Option<Value>,
    #[serde(default)]
    pub interest_history: Option<Value>,
    #[serde(default)]
    pub interest_spirituality: Option<Value>,
    #[serde(default)]
    pub interest_art: Option<Value>,
    #[serde(default)]
    pub visited_before: Option<Value>,
    #[serde(default)]
    pub explanation_type: Option<Value>,
    #[serde(default)]
    pub timeline_direction: Option<Value>,
    #[serde(default)]
    pub buddhist_history_knowledge: Option<Value>,
}

/// Build canonical attributes from a raw payload.
pub fn normalize(raw: RawVisitorInput) -> VisitorAttributes {
    let language_level = match text(&raw.language_level).as_str() {
        "Intermediate" => LanguageLevel::Moderate,
        other => LanguageLevel::from_label(other),
    };
    let visit_purpose = match text(&raw.visit_purpose).as_str() {
        "Educational" => VisitPurpose::AssignmentStudy,
        other => VisitPurpose::from_label(other),
    };
    let explanation_type = match text(&raw.explanation_type).as_str() {
        "Detailed" => ExplanationType::LongDetailed,
        other => ExplanationType::from_label(other),
    };
    let timeline_direction = match text(&raw.timeline_direction).as_str() {
        "Chronological" => TimelineDirection::PastToPresent,
        other => TimelineDirection::from_label(other),
    };

    VisitorAttributes {
        age_group: text(&raw.age_group),
        time_budget: raw.time_budget.as_ref().and_then(minutes),
        visit_purpose,
        language_level,
        interest_architecture: interest(&raw.interest_architecture),
        interest_history: interest(&raw.interest_history),
        interest_spirituality: interest(&raw.interest_spirituality),
        interest_art: if is_one(&raw.interest_art) {
            ArtInterest::Medium
        } else {
            ArtInterest::Low
        },
        visited_before: raw.visited_before.as_ref().is_some_and(truthy),
        explanation_type,
        timeline_direction,
        buddhist_history_knowledge: raw
            .buddhist_history_knowledge
            .as_ref()
            .map(BuddhistKnowledge::from_raw)
            .unwrap_or_default(),
    }
}

/// Render a raw scalar as a label. Missing and null become empty.
pub(crate) fn text(value: &Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_one(value: &Option<Value>) -> bool {
    matches!(value, Some(Value::Number(n)) if n.as_f64() == Some(1.0))
}

fn interest(value: &Option<Value>) -> InterestLevel {
    if is_one(value) {
        InterestLevel::High
    } else {
        InterestLevel::Low
    }
}

/// Booleans, non-zero numbers and "true"/"yes"/"1" count as true.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        _ => false,
    }
}

/// Whole minutes from a number or numeric string.
pub(crate) fn minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
