//! Canonical visitor attributes consumed by the persona pipeline.

use serde::{Deserialize, Serialize};

/// Declares a label-backed enum that keeps unrecognized labels verbatim.
///
/// Legacy clients send values outside the canonical set; those survive as
/// `Other(label)` so nothing is silently rewritten.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A label outside the canonical set, kept as received.
            Other(String),
        }

        impl $name {
            /// The label as stored and shown in prompts.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(label) => label,
                }
            }

            /// Exact, case-sensitive match against the canonical labels.
            pub fn from_label(label: &str) -> Self {
                match label {
                    $($label => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Other(String::new())
            }
        }

        impl From<String> for $name {
            fn from(label: String) -> Self {
                Self::from_label(&label)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labeled_enum! {
    /// Why the visitor came.
    VisitPurpose {
        AssignmentStudy => "Assignment/Study",
        Education => "Education",
        Tourism => "Tourism",
        Religious => "Religious",
        EnjoyExperience => "Enjoy Experience",
    }
}

labeled_enum! {
    /// Vocabulary level the visitor is comfortable with.
    LanguageLevel {
        Simple => "Simple",
        Moderate => "Moderate",
        Advanced => "Advanced",
    }
}

labeled_enum! {
    /// Preferred depth of guide explanations.
    ExplanationType {
        ShortHighlights => "Short Highlights",
        Balanced => "Balanced",
        LongDetailed => "Long Detailed",
    }
}

labeled_enum! {
    TimelineDirection {
        PastToPresent => "Past to Present",
        PresentToPast => "Present to Past",
    }
}

/// Interest scale for architecture, history and spirituality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterestLevel {
    #[default]
    Low,
    High,
}

impl InterestLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::High => "High",
        }
    }
}

/// Art interest uses its own two-step scale, topping out at `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArtInterest {
    #[default]
    Low,
    Medium,
}

impl ArtInterest {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
        }
    }
}

/// Prior knowledge of Buddhist history.
///
/// The ordinal scale is canonical. Boolean inputs convert at the boundary:
/// `true` means `Basic`, `false` means `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuddhistKnowledge {
    #[default]
    None,
    Basic,
    Intermediate,
    Advanced,
}

impl BuddhistKnowledge {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Integer encoding used by the `visitor` table.
    pub fn ordinal(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Basic => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
        }
    }

    /// Map a label to its level; anything unmapped is `None`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Basic" => Self::Basic,
            "Intermediate" => Self::Intermediate,
            "Advanced" => Self::Advanced,
            _ => Self::None,
        }
    }

    /// Decode any of the raw shapes clients send: a label, a boolean, or an
    /// integer ordinal. Unknown shapes map to `None`.
    pub fn from_raw(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Bool(true) => Self::Basic,
            Value::Bool(false) => Self::None,
            Value::String(label) => Self::from_label(label),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Self::Basic,
                Some(2) => Self::Intermediate,
                Some(3) => Self::Advanced,
                _ => Self::None,
            },
            _ => Self::None,
        }
    }
}

/// Canonical, post-normalization visitor profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisitorAttributes {
    pub age_group: String,
    /// Minutes the visitor intends to spend.
    pub time_budget: Option<u32>,
    pub visit_purpose: VisitPurpose,
    pub language_level: LanguageLevel,
    pub interest_architecture: InterestLevel,
    pub interest_history: InterestLevel,
    pub interest_spirituality: InterestLevel,
    pub interest_art: ArtInterest,
    pub visited_before: bool,
    pub explanation_type: ExplanationType,
    pub timeline_direction: TimelineDirection,
    pub buddhist_history_knowledge: BuddhistKnowledge,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn labels_round_trip_through_serde() {
        let purpose: VisitPurpose = serde_json::from_value(json!("Assignment/Study")).unwrap();
        assert_eq!(purpose, VisitPurpose::AssignmentStudy);
        assert_eq!(serde_json::to_value(&purpose).unwrap(), json!("Assignment/Study"));
    }

    #[test]
    fn unknown_label_is_kept_verbatim() {
        let level = LanguageLevel::from_label("Fluent");
        assert_eq!(level, LanguageLevel::Other("Fluent".to_string()));
        assert_eq!(level.as_str(), "Fluent");
    }

    #[test]
    fn label_matching_is_case_sensitive() {
        assert_eq!(
            TimelineDirection::from_label("past to present"),
            TimelineDirection::Other("past to present".to_string())
        );
    }

    #[test]
    fn buddhist_knowledge_ordinals_are_fixed() {
        let cases = [
            ("None", 0),
            ("Basic", 1),
            ("Intermediate", 2),
            ("Advanced", 3),
            ("Expert", 0),
            ("", 0),
        ];
        for (label, expected) in cases {
            assert_eq!(
                BuddhistKnowledge::from_label(label).ordinal(),
                expected,
                "label {label:?}"
            );
        }
    }

    #[test]
    fn buddhist_knowledge_accepts_boolean_and_numeric_shapes() {
        assert_eq!(BuddhistKnowledge::from_raw(&json!(true)), BuddhistKnowledge::Basic);
        assert_eq!(BuddhistKnowledge::from_raw(&json!(false)), BuddhistKnowledge::None);
        assert_eq!(BuddhistKnowledge::from_raw(&json!(2)), BuddhistKnowledge::Intermediate);
        assert_eq!(BuddhistKnowledge::from_raw(&json!(7)), BuddhistKnowledge::None);
        assert_eq!(BuddhistKnowledge::from_raw(&json!(null)), BuddhistKnowledge::None);
        assert_eq!(
            BuddhistKnowledge::from_raw(&json!("Advanced")),
            BuddhistKnowledge::Advanced
        );
    }
}
