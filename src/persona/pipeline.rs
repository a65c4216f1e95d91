//! Generate-validate-retry loop.
//!
//! `Start -> Normalized -> {Generating -> Validating}* -> {Accepted | Rejected}`
//!
//! Attempts are sequential and bounded by `max_attempts`. A generation error
//! (including a per-attempt timeout) aborts the run; it never consumes an
//! attempt slot silently.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::config::PersonaConfig;
use crate::error::{GenerationError, PersonaError};
use crate::persona::attributes::VisitorAttributes;
use crate::persona::generator::PersonaGenerator;
use crate::persona::normalize::{RawVisitorInput, normalize};
use crate::persona::validator::PersonaValidator;

/// Upper bound for a single inter-attempt pause.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PersonaOutcome {
    Accepted { summary: String, confidence: f64 },
    /// No attempt passed; carries the last computed confidence.
    Rejected { confidence: f64 },
}

impl PersonaOutcome {
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Accepted { confidence, .. } | Self::Rejected { confidence } => *confidence,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Result of a run, with the attributes it was computed from.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub attributes: VisitorAttributes,
    #[serde(flatten)]
    pub outcome: PersonaOutcome,
    /// Generation calls made, `1..=max_attempts`.
    pub attempts: u32,
}

pub struct PersonaPipeline {
    generator: Arc<dyn PersonaGenerator>,
    validator: PersonaValidator,
    config: PersonaConfig,
}

impl PersonaPipeline {
    pub fn new(generator: Arc<dyn PersonaGenerator>, config: PersonaConfig) -> Self {
        Self {
            generator,
            validator: PersonaValidator::new(config.confidence_threshold),
            config,
        }
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    /// Normalize `raw` once, then run the attempt loop.
    pub async fn run(&self, raw: RawVisitorInput) -> Result<PipelineRun, PersonaError> {
        self.run_normalized(normalize(raw)).await
    }

    pub async fn run_normalized(
        &self,
        attributes: VisitorAttributes,
    ) -> Result<PipelineRun, PersonaError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut confidence = 0.0;

        for attempt in 1..=max_attempts {
            let summary = self
                .generate_once(&attributes)
                .await
                .map_err(|source| {
                    tracing::warn!(attempt, error = %source, "Persona generation failed");
                    PersonaError::Generation { attempt, source }
                })?;

            let result = self.validator.validate(&attributes, &summary);
            confidence = result.confidence;
            tracing::info!(
                attempt,
                max_attempts,
                score = result.score,
                total_checks = result.total_checks,
                confidence = result.confidence,
                passed = result.passed,
                failed_checks = ?result.failed_checks,
                "Persona summary validated"
            );

            if result.passed {
                return Ok(PipelineRun {
                    attributes,
                    outcome: PersonaOutcome::Accepted {
                        summary,
                        confidence,
                    },
                    attempts: attempt,
                });
            }

            if attempt < max_attempts {
                let delay = backoff_delay(self.config.retry_backoff, attempt - 1);
                if !delay.is_zero() {
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying persona generation"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        tracing::warn!(
            attempts = max_attempts,
            confidence,
            "Persona rejected after exhausting attempts"
        );
        Ok(PipelineRun {
            attributes,
            outcome: PersonaOutcome::Rejected { confidence },
            attempts: max_attempts,
        })
    }

    async fn generate_once(&self, attrs: &VisitorAttributes) -> Result<String, GenerationError> {
        let timeout = self.config.attempt_timeout;
        tokio::time::timeout(timeout, self.generator.generate(attrs))
            .await
            .map_err(|_| GenerationError::Timeout { timeout })?
    }
}

/// `base * 2^retry` with uniform jitter in [-25%, +25%], capped at
/// [`MAX_BACKOFF`]. A zero base disables the pause.
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    if base.is_zero() {
        return Duration::ZERO;
    }
    let base_ms = base.as_millis() as u64;
    let exp_ms = base_ms.saturating_mul(2u64.saturating_pow(retry));
    let capped_ms = exp_ms.min(MAX_BACKOFF.as_millis() as u64);

    let jitter_range = capped_ms / 4;
    let jitter = if jitter_range > 0 {
        let offset = rand::thread_rng().gen_range(0..=jitter_range.saturating_mul(2));
        offset as i64 - jitter_range as i64
    } else {
        0
    };
    Duration::from_millis((capped_ms as i64 + jitter).max(1) as u64)
}
