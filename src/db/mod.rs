//! Persistence for personas, the guide queue and visit sessions.
//!
//! Handlers depend on `Arc<dyn Database>`; the only backend is libSQL
//! (a local file, optionally a Turso remote replica).

pub mod libsql;
mod libsql_migrations;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::db::libsql::LibSqlBackend;
use crate::error::DatabaseError;
use crate::persona::VisitorAttributes;
use crate::queue::{NewQueuedVisitor, QueueEntry};

/// Latest visit session of a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: i64,
    pub rating: Option<i64>,
}

#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Store an accepted persona and return its visitor id.
    async fn insert_persona(
        &self,
        attrs: &VisitorAttributes,
        summary: &str,
        confidence: f64,
    ) -> Result<i64, DatabaseError>;

    /// Append a visitor to the waiting queue.
    ///
    /// Returns `(visitor_id, queue_number)`. The queue number is one past the
    /// current count of waiting visitors, computed in the insert itself.
    async fn insert_queued_visitor(
        &self,
        visitor: &NewQueuedVisitor,
    ) -> Result<(i64, i64), DatabaseError>;

    /// Every visitor that checked in through the queue, ordered waiting,
    /// active, completed, cancelled, other; then by queue number. Stored
    /// personas without a queue number are not listed.
    async fn list_queue(&self) -> Result<Vec<QueueEntry>, DatabaseError>;

    /// Mark a queued visitor cancelled. `false` if no such visitor.
    async fn cancel_visitor(&self, visitor_id: i64) -> Result<bool, DatabaseError>;

    /// Mark a queued visitor active. `false` if no such visitor.
    async fn start_visitor(&self, visitor_id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new visit session and return its id.
    async fn start_session(&self, visitor_id: i64) -> Result<i64, DatabaseError>;

    async fn latest_session(
        &self,
        visitor_id: i64,
    ) -> Result<Option<SessionSummary>, DatabaseError>;

    /// Rate the visitor's latest session and close it.
    /// `false` if the visitor has no session.
    async fn submit_feedback(
        &self,
        visitor_id: i64,
        rating: u8,
        feedback: Option<&str>,
    ) -> Result<bool, DatabaseError>;
}

/// Everything the service needs from storage.
#[async_trait]
pub trait Database: VisitorStore + SessionStore {
    /// Create tables if they do not exist.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;
}

/// Open the configured backend and apply the schema.
pub async fn connect_from_config(
    config: &DatabaseConfig,
) -> Result<Arc<dyn Database>, DatabaseError> {
    use secrecy::ExposeSecret as _;

    let backend = match (&config.libsql_url, &config.libsql_auth_token) {
        (Some(url), Some(token)) => {
            LibSqlBackend::new_remote_replica(
                &config.libsql_path,
                url,
                token.expose_secret(),
            )
            .await?
        }
        (Some(_), None) => {
            return Err(DatabaseError::Connection(
                "LIBSQL_AUTH_TOKEN is required when LIBSQL_URL is set".to_string(),
            ));
        }
        (None, _) => LibSqlBackend::new_local(&config.libsql_path).await?,
    };

    backend.run_migrations().await?;
    Ok(Arc::new(backend))
}
