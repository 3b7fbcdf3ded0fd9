use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::RawRecord;

pub const DB_FILE: &str = "expensedesk.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    kind TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT
);

CREATE TABLE IF NOT EXISTS receipts (
    id INTEGER PRIMARY KEY,
    import_id INTEGER,
    payload TEXT NOT NULL,
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    import_id INTEGER,
    payload TEXT NOT NULL,
    FOREIGN KEY (import_id) REFERENCES imports(id)
);
";

/// Which raw table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Receipts,
    Users,
}

impl RecordKind {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Receipts => "receipts",
            Self::Users => "users",
        }
    }
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn insert_record(
    conn: &Connection,
    kind: RecordKind,
    import_id: Option<i64>,
    record: &RawRecord,
) -> Result<()> {
    let payload = serde_json::to_string(record)?;
    conn.execute(
        &format!("INSERT INTO {} (import_id, payload) VALUES (?1, ?2)", kind.table()),
        rusqlite::params![import_id, payload],
    )?;
    Ok(())
}

pub fn count_records(conn: &Connection, kind: RecordKind) -> Result<i64> {
    let n = conn.query_row(&format!("SELECT count(*) FROM {}", kind.table()), [], |r| {
        r.get(0)
    })?;
    Ok(n)
}

/// Load every row of `kind` in insertion order. Payloads that no longer
/// parse as a JSON object are skipped.
fn fetch_records(conn: &Connection, kind: RecordKind) -> Result<Vec<RawRecord>> {
    let mut stmt = conn.prepare(&format!("SELECT id, payload FROM {} ORDER BY id", kind.table()))?;
    let rows: Vec<(i64, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for (id, payload) in rows {
        match serde_json::from_str::<RawRecord>(&payload) {
            Ok(record) => records.push(record),
            Err(e) => debug!(table = kind.table(), id, error = %e, "unreadable payload skipped"),
        }
    }
    Ok(records)
}

pub fn fetch_receipts(conn: &Connection) -> Result<Vec<RawRecord>> {
    fetch_records(conn, RecordKind::Receipts)
}

pub fn fetch_users(conn: &Connection) -> Result<Vec<RawRecord>> {
    fetch_records(conn, RecordKind::Users)
}

/// User rows only feed display names, so a failed fetch degrades to empty.
pub fn fetch_users_best_effort(conn: &Connection) -> Vec<RawRecord> {
    fetch_users(conn).unwrap_or_else(|e| {
        warn!(error = %e, "user fetch failed, continuing without directory");
        Vec::new()
    })
}
