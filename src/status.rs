use crate::models::ReceiptStatus;

const QUOTES: &[char] = &['"', '\''];

/// Canonicalize a raw status value.
///
/// Upstream storage sometimes wraps the value in a stray pair of quotes
/// (`"Approved"` stored with the quotes), so one leading and one trailing
/// quote are dropped before matching. Total: never fails.
pub fn normalize_status(raw: Option<&str>) -> ReceiptStatus {
    let Some(raw) = raw else {
        return ReceiptStatus::Unknown;
    };
    let s = raw.trim();
    let s = s.strip_prefix(QUOTES).unwrap_or(s);
    let s = s.strip_suffix(QUOTES).unwrap_or(s);
    match s.trim().to_lowercase().as_str() {
        "approved" => ReceiptStatus::Approved,
        "pending" => ReceiptStatus::Pending,
        "rejected" => ReceiptStatus::Rejected,
        _ => ReceiptStatus::Unknown,
    }
}
