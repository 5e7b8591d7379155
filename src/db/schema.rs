// Database schema — table creation.
//
// A `schema_version` table tracks which schema revisions have been
// applied; `create_tables` is idempotent and safe to call on every
// startup.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per saved analysis project
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            min_theme_freq INTEGER NOT NULL,
            num_themes INTEGER NOT NULL,
            extraction_method TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Discovered themes, in taxonomy discovery order (position)
        -- Keywords stored as a JSON array so keyword ranking survives
        -- the round trip without a join table
        CREATE TABLE IF NOT EXISTS themes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            keywords TEXT NOT NULL,
            position INTEGER NOT NULL,
            UNIQUE (project_id, name)
        );

        -- The interview records each project was built from
        CREATE TABLE IF NOT EXISTS records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            group_name TEXT NOT NULL,
            question TEXT NOT NULL,
            response TEXT NOT NULL,
            respondent_id TEXT NOT NULL
        );

        -- Per-theme, per-question occurrence counts for each group
        CREATE TABLE IF NOT EXISTS question_counts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            theme_id INTEGER NOT NULL REFERENCES themes(id) ON DELETE CASCADE,
            group_name TEXT NOT NULL,
            question TEXT NOT NULL,
            count INTEGER NOT NULL
        );

        -- Session state — currently loaded project and friends
        CREATE TABLE IF NOT EXISTS session_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_themes_project
            ON themes(project_id, position);

        CREATE INDEX IF NOT EXISTS idx_records_project_group
            ON records(project_id, group_name);

        CREATE INDEX IF NOT EXISTS idx_counts_project_theme
            ON question_counts(project_id, theme_id);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
