//! Visitor persona generation: normalize, generate, validate, retry.

pub mod attributes;
pub mod generator;
pub mod normalize;
pub mod pipeline;
pub mod service;
pub mod validator;

pub use attributes::{
    ArtInterest, BuddhistKnowledge, ExplanationType, InterestLevel, LanguageLevel,
    TimelineDirection, VisitPurpose, VisitorAttributes,
};
pub use generator::{LlmPersonaGenerator, PersonaGenerator, build_prompt};
pub use normalize::{RawVisitorInput, normalize};
pub use pipeline::{PersonaOutcome, PersonaPipeline, PipelineRun};
pub use service::{PersonaService, PersonaSubmission};
pub use validator::{DEFAULT_CONFIDENCE_THRESHOLD, PersonaValidator, ValidationResult};
