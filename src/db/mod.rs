#[macro_use]
pub mod macros;
pub mod migrations;
pub mod models;
pub mod repos;

use r2d2::{CustomizeConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::error::AppError;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Connection customizer that sets per-connection SQLite pragmas.
#[derive(Debug)]
struct SqlitePragmaCustomizer;

impl CustomizeConnection<rusqlite::Connection, rusqlite::Error> for SqlitePragmaCustomizer {
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -8000;",
        )?;
        Ok(())
    }
}

/// Initialize the database: create file, enable WAL, run migrations, seed data.
pub fn init_db(app_data_dir: &Path) -> Result<DbPool, AppError> {
    std::fs::create_dir_all(app_data_dir)?;
    let db_path = app_data_dir.join("persona-chat.db");

    tracing::info!(path = %db_path.display(), "Initializing database");

    let manager = SqliteConnectionManager::file(&db_path);
    let pool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(SqlitePragmaCustomizer))
        .build(manager)?;

    // Set WAL journal mode (database-wide, only needs to run once)
    {
        let conn = pool.get()?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        tracing::debug!("SQLite pragmas configured (WAL, FK, busy_timeout)");
    }

    // Run migrations
    {
        let conn = pool.get()?;
        migrations::run(&conn)?;
    }

    // Seed builtin data
    {
        let conn = pool.get()?;
        seed_builtin_personas(&conn)?;
    }

    tracing::info!("Database initialized successfully");
    Ok(pool)
}

/// Resolve the default application data directory.
pub fn default_data_dir() -> std::path::PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("persona-chat")
}

/// Seed the predefined persona catalog. `INSERT OR IGNORE` keeps user edits
/// to non-key columns out of scope and makes re-seeding a no-op.
fn seed_builtin_personas(conn: &rusqlite::Connection) -> Result<(), AppError> {
    let now = chrono::Utc::now().to_rfc3339();

    let personas = [
        (
            "builtin-hitesh-choudhary",
            "Hitesh Choudhary",
            "Popular coding instructor known for practical tutorials and clear explanations. \
             Speaks in Hindi-English mix with enthusiasm for teaching programming concepts.",
            "👨\u{200d}💻",
            Some(
                "You are Hitesh Choudhary, a popular Indian coding instructor and YouTuber known \
                 for practical programming tutorials. You have a warm, encouraging teaching style \
                 and naturally mix Hindi and English (Hinglish) with phrases like \"Hanji\", \
                 \"Chaliye shuru karte hain\", \"Samjha na?\". You make programming accessible with \
                 simple real-world examples, focus on practical application over theory, and are \
                 known for JavaScript, React, and web development expertise. Always stay in \
                 character and keep explanations clear and practical.",
            ),
            r#"["JavaScript","TypeScript","React","Node.js","NextJs","Teaching","Web Development"]"#,
            r#"["Hanji to aa rhe ho na sath me? Code karne ka mann ho ya na ho, chai pe charcha to banti hai.","Consistency is the only cheat code in coding. Daily 1% improvement compounds faster than you think."]"#,
            r#"["Chaliye shuru karte hain — aaj hum baat karenge JavaScript ke closures ke baare me. Closure simply ek function hai jo apne lexical scope ko yaad rakhta hai, even after the outer function has returned."]"#,
        ),
        (
            "builtin-piyush-garg",
            "Piyush Garg",
            "Tech entrepreneur and educator focused on system design and backend development. \
             Known for his structured approach to explaining complex technical concepts.",
            "🧑\u{200d}💼",
            Some(
                "You are Piyush Garg, a tech entrepreneur and educator known for expertise in \
                 system design, backend development, and building scalable applications. You break \
                 complex problems into manageable components, explain step by step, use examples \
                 from companies like Netflix and Uber, and always discuss trade-offs, edge cases, \
                 and system limitations. Always stay in character and keep your analytical, \
                 structured teaching style.",
            ),
            r#"["System Design","Backend","Databases","Architecture","Scalability"]"#,
            r#"["Start with a monolith. Move to microservices only when scale forces you to — every architecture choice is a trade-off, not a fashion statement."]"#,
            r#"["Monolith means one: all backend code in a single repository, deployed to one server. It is easy to manage, but a bug in any service can take the whole server down — that is the fundamental trade-off against microservices."]"#,
        ),
    ];

    for (id, name, description, avatar, system_prompt, specialties, styles, notes) in &personas {
        conn.execute(
            "INSERT OR IGNORE INTO personas
             (id, name, description, avatar, system_prompt, specialties,
              style_examples, reference_notes, is_builtin, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)",
            params![id, name, description, avatar, system_prompt, specialties, styles, notes, now],
        )?;
    }

    tracing::debug!("Builtin personas seeded");
    Ok(())
}

#[cfg(test)]
pub fn init_test_db() -> Result<DbPool, AppError> {
    use std::time::Duration;

    // Use a unique temp file for each test to avoid in-memory connection issues with r2d2.
    let tmp = std::env::temp_dir().join(format!("persona_chat_test_{}.db", uuid::Uuid::new_v4()));
    let manager = SqliteConnectionManager::file(&tmp);
    let pool = Pool::builder()
        .max_size(2)
        .connection_timeout(Duration::from_secs(5))
        .connection_customizer(Box::new(SqlitePragmaCustomizer))
        .build(manager)?;

    let conn = pool.get()?;
    migrations::run(&conn)?;
    seed_builtin_personas(&conn)?;
    drop(conn);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeding_is_idempotent() {
        let pool = init_test_db().unwrap();
        let conn = pool.get().unwrap();

        // Re-run seeding; INSERT OR IGNORE must not duplicate rows.
        seed_builtin_personas(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM personas WHERE is_builtin = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
