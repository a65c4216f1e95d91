//! SQLite-dialect schema for the libSQL backend.
//!
//! Applied on every startup; idempotent via `IF NOT EXISTS`.

/// Visitor and session tables.
///
/// Enumerated attributes are stored as their canonical labels;
/// `buddhist_history_knowledge` as its 0-3 ordinal and `visited_before`
/// as 0/1.
pub const SCHEMA: &str = r#"

-- ==================== Visitors ====================

CREATE TABLE IF NOT EXISTS visitor (
    visitor_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    age_group TEXT,
    time_budget INTEGER,
    visit_purpose TEXT,
    language_level TEXT,
    interest_architecture TEXT,
    interest_history TEXT,
    interest_spirituality TEXT,
    interest_art TEXT,
    visited_before INTEGER NOT NULL DEFAULT 0,
    explanation_type TEXT,
    timeline_direction TEXT,
    preferred_time TEXT,
    buddhist_history_knowledge INTEGER NOT NULL DEFAULT 0,
    persona_summary TEXT,
    confidence_score REAL,
    queue_number INTEGER,
    status TEXT NOT NULL DEFAULT 'waiting',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_visitor_status ON visitor(status);
CREATE INDEX IF NOT EXISTS idx_visitor_queue ON visitor(status, queue_number);

-- ==================== Visit sessions ====================

CREATE TABLE IF NOT EXISTS session (
    session_id INTEGER PRIMARY KEY AUTOINCREMENT,
    visitor_id INTEGER NOT NULL REFERENCES visitor(visitor_id) ON DELETE CASCADE,
    rating INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
    feedback TEXT,
    session_start TEXT NOT NULL DEFAULT (datetime('now')),
    session_end TEXT
);

CREATE INDEX IF NOT EXISTS idx_session_visitor ON session(visitor_id);
"#;
