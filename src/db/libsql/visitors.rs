//! VisitorStore implementation for LibSqlBackend.

use async_trait::async_trait;
use libsql::params;

use super::{LibSqlBackend, get_i64, get_opt_i64, get_opt_text};
use crate::db::VisitorStore;
use crate::error::DatabaseError;
use crate::persona::VisitorAttributes;
use crate::queue::{NewQueuedVisitor, QueueEntry, VisitorStatus};

impl LibSqlBackend {
    async fn set_status(
        &self,
        visitor_id: i64,
        status: VisitorStatus,
    ) -> Result<bool, DatabaseError> {
        let conn = self.connect().await?;
        let affected = conn
            .execute(
                "UPDATE visitor SET status = ?1 \
                 WHERE visitor_id = ?2 AND queue_number IS NOT NULL",
                params![status.as_str(), visitor_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl VisitorStore for LibSqlBackend {
    async fn insert_persona(
        &self,
        attrs: &VisitorAttributes,
        summary: &str,
        confidence: f64,
    ) -> Result<i64, DatabaseError> {
        let conn = self.connect().await?;
        conn.execute(
            r#"
            INSERT INTO visitor (
                age_group, time_budget, visit_purpose, language_level,
                interest_architecture, interest_history, interest_spirituality,
                interest_art, visited_before, explanation_type, timeline_direction,
                buddhist_history_knowledge, persona_summary, confidence_score, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                attrs.age_group.as_str(),
                attrs.time_budget.map(i64::from),
                attrs.visit_purpose.as_str(),
                attrs.language_level.as_str(),
                attrs.interest_architecture.as_str(),
                attrs.interest_history.as_str(),
                attrs.interest_spirituality.as_str(),
                attrs.interest_art.as_str(),
                i64::from(attrs.visited_before),
                attrs.explanation_type.as_str(),
                attrs.timeline_direction.as_str(),
                attrs.buddhist_history_knowledge.ordinal(),
                summary,
                confidence,
                VisitorStatus::Profiled.as_str(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(conn.last_insert_rowid())
    }

    async fn insert_queued_visitor(
        &self,
        visitor: &NewQueuedVisitor,
    ) -> Result<(i64, i64), DatabaseError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                r#"
                INSERT INTO visitor (
                    name, age_group, visit_purpose, interest_architecture,
                    interest_history, interest_spirituality, interest_art,
                    visited_before, language_level, explanation_type, time_budget,
                    timeline_direction, preferred_time, buddhist_history_knowledge,
                    queue_number, status
                )
                SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       COUNT(*) + 1, ?15
                FROM visitor WHERE status = ?15 AND queue_number IS NOT NULL
                RETURNING visitor_id, queue_number
                "#,
                params![
                    visitor.name.as_str(),
                    visitor.age_group.as_str(),
                    visitor.visit_purpose.as_str(),
                    visitor.interest_architecture.as_str(),
                    visitor.interest_history.as_str(),
                    visitor.interest_spirituality.as_str(),
                    visitor.interest_art.as_str(),
                    i64::from(visitor.visited_before),
                    visitor.language_level.as_str(),
                    visitor.explanation_type.as_str(),
                    i64::from(visitor.time_budget),
                    visitor.timeline_direction.as_str(),
                    visitor.preferred_time.as_str(),
                    visitor.buddhist_history_knowledge.ordinal(),
                    VisitorStatus::Waiting.as_str(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?
            .ok_or_else(|| DatabaseError::Query("insert returned no row".to_string()))?;
        Ok((get_i64(&row, 0)?, get_i64(&row, 1)?))
    }

    async fn list_queue(&self) -> Result<Vec<QueueEntry>, DatabaseError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                r#"
                SELECT visitor_id, name, status, queue_number
                FROM visitor
                WHERE queue_number IS NOT NULL
                ORDER BY
                    CASE status
                        WHEN 'waiting' THEN 1
                        WHEN 'active' THEN 2
                        WHEN 'completed' THEN 3
                        WHEN 'cancelled' THEN 4
                        ELSE 5
                    END,
                    queue_number ASC
                "#,
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut entries = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?
        {
            entries.push(QueueEntry {
                visitor_id: get_i64(&row, 0)?,
                name: get_opt_text(&row, 1),
                status: get_opt_text(&row, 2).unwrap_or_default(),
                queue_number: get_opt_i64(&row, 3),
            });
        }
        Ok(entries)
    }

    async fn cancel_visitor(&self, visitor_id: i64) -> Result<bool, DatabaseError> {
        self.set_status(visitor_id, VisitorStatus::Cancelled).await
    }

    async fn start_visitor(&self, visitor_id: i64) -> Result<bool, DatabaseError> {
        self.set_status(visitor_id, VisitorStatus::Active).await
    }
}
