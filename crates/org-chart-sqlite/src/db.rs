//! Database Connection and Setup
//!
//! Opens the SQLite database and runs migrations.

use std::path::Path;

use org_chart_core::{DomainError, DomainResult};
use rusqlite::Connection;

/// Open (or create) the database at `path` and bring the schema up to date.
/// `:memory:` gives a private in-memory database.
pub fn init_db(path: impl AsRef<Path>) -> DomainResult<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)
        .map_err(|e| DomainError::Internal(format!("Failed to open {}: {}", path.display(), e)))?;
    run_migrations(&conn)?;
    log::info!("hierarchy database ready at {}", path.display());
    Ok(conn)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    for name in names {
        if name.map_err(|e| DomainError::Internal(e.to_string()))? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS hierarchy_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            parent_id INTEGER,
            level INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0,
            position_x INTEGER NOT NULL DEFAULT 0,
            position_y INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER,
            updated_at INTEGER
        )",
        [],
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    // Occupancy arrived after the first schema
    if !column_exists(conn, "hierarchy_items", "holder_count")? {
        conn.execute("ALTER TABLE hierarchy_items ADD COLUMN holder_count INTEGER", [])
            .map_err(|e| DomainError::Internal(format!("Failed to add holder_count: {}", e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_hierarchy_items_parent ON hierarchy_items(parent_id)",
        [],
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_in_memory() {
        let conn = init_db(":memory:").unwrap();
        assert!(column_exists(&conn, "hierarchy_items", "holder_count").unwrap());
        assert!(!column_exists(&conn, "hierarchy_items", "missing").unwrap());
    }

    #[test]
    fn test_init_on_disk_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.db");
        drop(init_db(&path).unwrap());
        // second open runs migrations against an existing schema
        let conn = init_db(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM hierarchy_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
