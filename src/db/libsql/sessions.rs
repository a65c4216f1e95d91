//! SessionStore implementation for LibSqlBackend.

use async_trait::async_trait;
use libsql::params;

use super::{LibSqlBackend, get_i64, get_opt_i64};
use crate::db::{SessionStore, SessionSummary};
use crate::error::DatabaseError;

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn start_session(&self, visitor_id: i64) -> Result<i64, DatabaseError> {
        let conn = self.connect().await?;
        conn.execute(
            "INSERT INTO session (visitor_id) VALUES (?1)",
            params![visitor_id],
        )
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    async fn latest_session(
        &self,
        visitor_id: i64,
    ) -> Result<Option<SessionSummary>, DatabaseError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                "SELECT session_id, rating FROM session \
                 WHERE visitor_id = ?1 ORDER BY session_id DESC LIMIT 1",
                params![visitor_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?
        else {
            return Ok(None);
        };
        Ok(Some(SessionSummary {
            session_id: get_i64(&row, 0)?,
            rating: get_opt_i64(&row, 1),
        }))
    }

    async fn submit_feedback(
        &self,
        visitor_id: i64,
        rating: u8,
        feedback: Option<&str>,
    ) -> Result<bool, DatabaseError> {
        let conn = self.connect().await?;
        let affected = conn
            .execute(
                r#"
                UPDATE session
                SET rating = ?1, feedback = ?2, session_end = datetime('now')
                WHERE session_id = (
                    SELECT MAX(session_id) FROM session WHERE visitor_id = ?3
                )
                "#,
                params![i64::from(rating), feedback, visitor_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(affected > 0)
    }
}
