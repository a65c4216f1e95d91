//! Pipeline plus persistence: the unit behind `POST /persona-summary`.

use std::sync::Arc;

use serde::Serialize;

use crate::db::VisitorStore;
use crate::error::PersonaError;
use crate::persona::normalize::RawVisitorInput;
use crate::persona::pipeline::{PersonaOutcome, PersonaPipeline};

/// What the requester gets back from a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PersonaSubmission {
    Stored {
        visitor_id: i64,
        confidence: f64,
        persona_summary: String,
        #[serde(skip)]
        attempts: u32,
    },
    Rejected { confidence: f64, attempts: u32 },
}

pub struct PersonaService {
    pipeline: PersonaPipeline,
    store: Arc<dyn VisitorStore>,
}

impl PersonaService {
    pub fn new(pipeline: PersonaPipeline, store: Arc<dyn VisitorStore>) -> Self {
        Self { pipeline, store }
    }

    /// Run the pipeline; only an accepted summary is written.
    pub async fn submit(&self, raw: RawVisitorInput) -> Result<PersonaSubmission, PersonaError> {
        let run = self.pipeline.run(raw).await?;
        match run.outcome {
            PersonaOutcome::Accepted {
                summary,
                confidence,
            } => {
                let visitor_id = self
                    .store
                    .insert_persona(&run.attributes, &summary, confidence)
                    .await?;
                tracing::info!(visitor_id, confidence, attempts = run.attempts, "Persona stored");
                Ok(PersonaSubmission::Stored {
                    visitor_id,
                    confidence,
                    persona_summary: summary,
                    attempts: run.attempts,
                })
            }
            PersonaOutcome::Rejected { confidence } => Ok(PersonaSubmission::Rejected {
                confidence,
                attempts: run.attempts,
            }),
        }
    }
}
