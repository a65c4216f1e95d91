//! Guide queue submissions from the QR form.
//!
//! Unlike persona input, queue submissions are mapped strictly: every
//! enumerated field lands on a canonical value, with a fixed default for
//! anything unrecognized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persona::normalize::{text, truthy};
use crate::persona::{
    ArtInterest, BuddhistKnowledge, ExplanationType, InterestLevel, LanguageLevel,
    TimelineDirection, VisitPurpose,
};
use crate::tokens::TempVisitor;

const DEFAULT_AGE_GROUP: &str = "19-25";

/// When the visitor wants to tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreferredTime {
    #[default]
    Day,
    Night,
    Both,
}

impl PreferredTime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Night => "Night",
            Self::Both => "Both",
        }
    }
}

/// Lifecycle of a queued visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorStatus {
    /// Stored persona that never checked in; not part of the queue.
    Profiled,
    Waiting,
    Active,
    Completed,
    Cancelled,
}

impl VisitorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profiled => "profiled",
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Body of `POST /api/visitor/submit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueSubmission {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub age_group: Option<Value>,
    #[serde(default)]
    pub visit_purpose: Option<Value>,
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
    pub language_level: Option<Value>,
    #[serde(default)]
    pub explanation_type: Option<Value>,
    #[serde(default)]
    pub timeline_direction: Option<Value>,
    #[serde(default)]
    pub preferred_time: Option<Value>,
    #[serde(default)]
    pub buddhist_history_knowledge: Option<Value>,
}

/// A fully-mapped row ready for the `visitor` table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueuedVisitor {
    pub name: String,
    pub age_group: String,
    pub time_budget: u32,
    pub visit_purpose: VisitPurpose,
    pub language_level: LanguageLevel,
    pub interest_architecture: InterestLevel,
    pub interest_history: InterestLevel,
    pub interest_spirituality: InterestLevel,
    pub interest_art: ArtInterest,
    pub visited_before: bool,
    pub explanation_type: ExplanationType,
    pub timeline_direction: TimelineDirection,
    pub preferred_time: PreferredTime,
    pub buddhist_history_knowledge: BuddhistKnowledge,
}

/// One row of the queue view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    pub visitor_id: i64,
    pub name: Option<String>,
    pub status: String,
    pub queue_number: Option<i64>,
}

impl QueueSubmission {
    /// Combine the form answers with the kiosk-captured visitor.
    pub fn into_new_visitor(self, temp: TempVisitor) -> NewQueuedVisitor {
        let age_group = text(&self.age_group);
        let language_level = text(&self.language_level);

        NewQueuedVisitor {
            name: temp.name,
            age_group: if age_group.is_empty() {
                DEFAULT_AGE_GROUP.to_string()
            } else {
                age_group
            },
            time_budget: temp.duration,
            visit_purpose: map_visit_purpose(&text(&self.visit_purpose)),
            language_level: if language_level.is_empty() {
                LanguageLevel::Simple
            } else {
                LanguageLevel::from_label(&language_level)
            },
            interest_architecture: map_interest(&self.interest_architecture),
            interest_history: map_interest(&self.interest_history),
            interest_spirituality: map_interest(&self.interest_spirituality),
            interest_art: match text(&self.interest_art).as_str() {
                "Medium" => ArtInterest::Medium,
                _ => ArtInterest::Low,
            },
            visited_before: self.visited_before.as_ref().is_some_and(truthy),
            explanation_type: match text(&self.explanation_type).as_str() {
                "Short" => ExplanationType::ShortHighlights,
                "Long" => ExplanationType::LongDetailed,
                _ => ExplanationType::Balanced,
            },
            timeline_direction: match text(&self.timeline_direction).as_str() {
                "Present to Past" => TimelineDirection::PresentToPast,
                _ => TimelineDirection::PastToPresent,
            },
            preferred_time: match text(&self.preferred_time).as_str() {
                "Night" => PreferredTime::Night,
                "Both" => PreferredTime::Both,
                _ => PreferredTime::Day,
            },
            buddhist_history_knowledge: self
                .buddhist_history_knowledge
                .as_ref()
                .map(BuddhistKnowledge::from_raw)
                .unwrap_or_default(),
        }
    }
}

fn map_visit_purpose(label: &str) -> VisitPurpose {
    match label {
        "Assignment/study" => VisitPurpose::AssignmentStudy,
        "Education" => VisitPurpose::Education,
        "Tourism" => VisitPurpose::Tourism,
        "Religious" => VisitPurpose::Religious,
        _ => VisitPurpose::EnjoyExperience,
    }
}

fn map_interest(value: &Option<Value>) -> InterestLevel {
    match text(value).as_str() {
        "High" => InterestLevel::High,
        _ => InterestLevel::Low,
    }
}
