//! libSQL/Turso backend for the `Database` trait.
//!
//! A file-backed database shares state across connections; each store call
//! opens its own connection from the shared handle.

mod sessions;
mod visitors;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Builder, Connection};

use crate::db::Database;
use crate::db::libsql_migrations::SCHEMA;
use crate::error::DatabaseError;

pub struct LibSqlBackend {
    db: Arc<libsql::Database>,
}

impl LibSqlBackend {
    /// Open (or create) a local database file.
    pub async fn new_local(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        tracing::info!(path = %path.display(), "Opened libSQL database");
        Ok(Self { db: Arc::new(db) })
    }

    /// Open a local replica that syncs with a remote Turso database.
    pub async fn new_remote_replica(
        path: impl AsRef<Path>,
        url: &str,
        auth_token: &str,
    ) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let db = Builder::new_remote_replica(path, url.to_string(), auth_token.to_string())
            .build()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        db.sync()
            .await
            .map_err(|e| DatabaseError::Connection(format!("initial sync failed: {e}")))?;
        tracing::info!(path = %path.display(), url, "Opened libSQL remote replica");
        Ok(Self { db: Arc::new(db) })
    }

    pub(crate) async fn connect(&self) -> Result<Connection, DatabaseError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(conn)
    }
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let conn = self.connect().await?;
        conn.execute_batch(SCHEMA)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        tracing::debug!("libSQL schema is up to date");
        Ok(())
    }
}

/// Nullable TEXT column; NULL and type mismatches read as `None`.
pub(crate) fn get_opt_text(row: &libsql::Row, idx: i32) -> Option<String> {
    row.get::<Option<String>>(idx).ok().flatten()
}

/// Nullable INTEGER column.
pub(crate) fn get_opt_i64(row: &libsql::Row, idx: i32) -> Option<i64> {
    row.get::<Option<i64>>(idx).ok().flatten()
}

pub(crate) fn get_i64(row: &libsql::Row, idx: i32) -> Result<i64, DatabaseError> {
    row.get::<i64>(idx)
        .map_err(|e| DatabaseError::Query(format!("column {idx}: {e}")))
}
