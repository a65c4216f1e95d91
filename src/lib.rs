//! HeritXr: visitor persona summaries and guide-queue services for a
//! heritage site.
//!
//! A raw visitor profile is normalized, turned into a persona summary by a
//! chat-completion model, scored by a deterministic validator and retried a
//! bounded number of times. Accepted personas are stored in libSQL next to
//! the QR check-in queue and post-visit feedback.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod persona;
pub mod queue;
pub mod server;
pub mod tokens;

pub use config::Config;
pub use error::{Error, Result};
