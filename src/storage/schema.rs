//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Gossamer database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl job lifecycle records
CREATE TABLE IF NOT EXISTS jobs (
    unique_name TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    status TEXT NOT NULL,
    status_id INTEGER NOT NULL,
    started_at TEXT,
    finished_at TEXT,
    crawled_pages INTEGER NOT NULL DEFAULT 0,
    cycle_number INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_jobs_name ON jobs(name);

-- URLs confirmed unreachable or invalid, shared across jobs
CREATE TABLE IF NOT EXISTS dead_links (
    url TEXT PRIMARY KEY,
    last_crawled_at TEXT NOT NULL
);

-- Discovered downloadable file references, shared across jobs
CREATE TABLE IF NOT EXISTS file_links (
    url TEXT PRIMARY KEY,
    extension TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_file_links_extension ON file_links(extension);

-- Snapshots of fetched pages, latest fetch wins
CREATE TABLE IF NOT EXISTS page_snapshots (
    url TEXT PRIMARY KEY,
    domain TEXT NOT NULL,
    title TEXT,
    html TEXT NOT NULL,
    status_code INTEGER,
    last_modified TEXT,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_page_snapshots_domain ON page_snapshots(domain);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["jobs", "dead_links", "file_links", "page_snapshots"] {
            let count: i64 = conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{}'",
                        table
                    ),
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
