use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::{NormalizedReceipt, RawRecord};
use crate::status::normalize_status;

// ---------------------------------------------------------------------------
// Field precedence (first populated spelling wins, the rest are ignored)
// ---------------------------------------------------------------------------

pub const RECEIPT_ID_FIELDS: &[&str] = &["Id", "id"];
pub const OWNER_KEY_FIELDS: &[&str] = &["UserID", "UserId", "EmployeeId"];
pub const VENDOR_FIELDS: &[&str] = &["MerchantName"];
pub const AMOUNT_FIELD: &str = "TotalAmount";
pub const STATUS_FIELD: &str = "Status";
pub const EFFECTIVE_DATE_FIELDS: &[&str] = &["ApprovalDate", "ApprovedDate", "TransactionDate"];
pub const TRANSACTION_DATE_FIELD: &str = "TransactionDate";
pub const NAME_HINT_FIELDS: &[&str] = &["EmployeeName", "Username", "UserName"];

pub const UNKNOWN_VENDOR: &str = "Unknown";

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Numeric coercion of an amount cell. Anything unparseable or non-finite becomes 0.
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_amount(s),
        _ => 0.0,
    };
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

/// `"$1,234.56"`, `"(20.00)"` and plain decimals. `inf`/`nan` spellings and
/// overflowing literals like `1e999` are rejected as 0.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => -finite(inner.trim()),
        None => finite(s),
    }
}

fn finite(s: &str) -> f64 {
    s.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn parse_date_mdy(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].trim().parse().ok()?;
    let d: u32 = parts[1].trim().parse().ok()?;
    let y: i32 = parts[2].trim().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Parse the date-ish shapes the receipts table has been seen to hold.
///
/// Offsets are not applied: `2025-01-05T23:00:00-05:00` is the 5th, as written.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_mdy(raw))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn parse_date(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%Y-%m-%d").to_string())
}

// ---------------------------------------------------------------------------
// resolve_receipt
// ---------------------------------------------------------------------------

/// First candidate field whose value parses as a calendar date.
pub fn effective_date(raw: &RawRecord) -> Option<String> {
    EFFECTIVE_DATE_FIELDS
        .iter()
        .filter_map(|f| raw.text(f))
        .find_map(|v| parse_date(&v))
}

/// Resolve the canonical fields of a raw receipt. `display_name` is left
/// empty for the directory join to fill.
pub fn resolve_receipt(raw: &RawRecord) -> NormalizedReceipt {
    let transaction_at = raw
        .text(TRANSACTION_DATE_FIELD)
        .and_then(|v| parse_timestamp(&v));

    NormalizedReceipt {
        id: raw.first_text(RECEIPT_ID_FIELDS),
        owner_key: raw.first_text(OWNER_KEY_FIELDS),
        vendor: raw
            .first_text(VENDOR_FIELDS)
            .unwrap_or_else(|| UNKNOWN_VENDOR.to_string()),
        amount: coerce_amount(raw.get(AMOUNT_FIELD)),
        status: normalize_status(raw.text(STATUS_FIELD).as_deref()),
        effective_date: effective_date(raw),
        transaction_date: transaction_at.map(|dt| dt.format("%Y-%m-%d").to_string()),
        transaction_at,
        name_hints: NAME_HINT_FIELDS.iter().filter_map(|f| raw.text(f)).collect(),
        display_name: String::new(),
    }
}
