use std::path::Path;

use rusqlite::Connection;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::{insert_record, RecordKind};
use crate::error::{ExpenseError, Result};
use crate::models::RawRecord;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ExpenseError::UnknownFormat(path.display().to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// A bare array of objects, or the data API envelope `{ "value": [...] }`.
pub fn parse_json(data: &[u8]) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_slice(data)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("value") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ExpenseError::Other(
                    "JSON export must be an array or an object with a \"value\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ExpenseError::Other(
                "JSON export must be an array or an object with a \"value\" array".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(RawRecord::from(map)),
            _ => debug!(row = idx, "non-object row skipped"),
        }
    }
    Ok(records)
}

/// Header row names the fields; empty cells are left out of the record.
pub fn parse_csv(data: &[u8]) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut raw = RawRecord::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header.is_empty() || cell.trim().is_empty() {
                continue;
            }
            raw = raw.with(header, cell);
        }
        if !raw.0.is_empty() {
            records.push(raw);
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicate_file: bool,
}

pub fn import_file(conn: &Connection, file_path: &Path, kind: RecordKind) -> Result<ImportResult> {
    let format = ExportFormat::from_path(file_path)?;
    let data = std::fs::read(file_path)?;

    let checksum = compute_checksum(&data);
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND kind = ?2")?;
        if stmt.exists(rusqlite::params![checksum, kind.table()])? {
            return Ok(ImportResult {
                imported: 0,
                duplicate_file: true,
            });
        }
    }

    let records = match format {
        ExportFormat::Json => parse_json(&data)?,
        ExportFormat::Csv => parse_csv(&data)?,
    };

    conn.execute(
        "INSERT INTO imports (filename, kind, record_count, checksum) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            kind.table(),
            records.len() as i64,
            checksum,
        ],
    )?;
    let import_id = conn.last_insert_rowid();

    for record in &records {
        insert_record(conn, kind, Some(import_id), record)?;
    }
    info!(file = %file_path.display(), kind = kind.table(), rows = records.len(), "import complete");

    Ok(ImportResult {
        imported: records.len(),
        duplicate_file: false,
    })
}
