use rusqlite::Connection;

use crate::error::AppError;

/// Run the consolidated schema migration. Idempotent.
pub fn run(conn: &Connection) -> Result<(), AppError> {
    tracing::debug!("Running database migrations");

    conn.execute_batch(SCHEMA)?;

    tracing::info!("Database migrations complete");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Personas (catalog: builtin + user-created)
-- ============================================================================

CREATE TABLE IF NOT EXISTS personas (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL UNIQUE,
    description     TEXT NOT NULL,
    avatar          TEXT NOT NULL DEFAULT '🤖',
    system_prompt   TEXT,
    specialties     TEXT,
    style_examples  TEXT,
    reference_notes TEXT,
    is_builtin      INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_personas_builtin ON personas(is_builtin);

-- ============================================================================
-- Key-value blob store (memory subsystem persistence)
--
-- Two well-known keys: 'persona-memories' (full memory list) and
-- 'persona-summaries' (summary map), each a JSON document rewritten
-- whole on every memory mutation.
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

"#;
