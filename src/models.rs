use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A loosely-typed row as it comes out of the receipts or users table.
///
/// Column names and value types are not uniform across rows, so nothing is
/// assumed beyond "JSON object". Use [`RawRecord::text`] to read a field in
/// its string-coerced form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, mostly for CSV rows and tests.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String form of a field, trimmed. `None` for absent, null or blank values.
    pub fn text(&self, key: &str) -> Option<String> {
        let coerced = coerce_to_string(self.0.get(key)?)?;
        let trimmed = coerced.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// First field in `keys` that has a non-blank value.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                // 12.0 reads as "12" so numeric ids match their string spelling
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Approved,
    Pending,
    Rejected,
    #[default]
    Unknown,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Pending => "Pending",
            Self::Rejected => "Rejected",
            Self::Unknown => "Unknown",
        }
    }

    /// Anything not explicitly approved or rejected is awaiting action.
    pub fn folds_to_pending(&self) -> bool {
        matches!(self, Self::Pending | Self::Unknown)
    }
}

/// A receipt after field resolution. Built per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedReceipt {
    pub id: Option<String>,
    pub owner_key: Option<String>,
    pub vendor: String,
    /// Unrounded; rounding to cents happens at aggregation output.
    pub amount: f64,
    pub status: ReceiptStatus,
    /// YYYY-MM-DD, approval date preferred over transaction date.
    pub effective_date: Option<String>,
    pub transaction_date: Option<String>,
    #[serde(skip)]
    pub transaction_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub name_hints: Vec<String>,
    pub display_name: String,
}

impl NormalizedReceipt {
    pub fn is_attributable(&self) -> bool {
        self.owner_key.is_some()
    }

    pub fn is_approved(&self) -> bool {
        self.status == ReceiptStatus::Approved
    }

    /// True when the effective date falls in `month` (YYYY-MM).
    pub fn in_month(&self, month: &str) -> bool {
        self.effective_date
            .as_deref()
            .is_some_and(|d| d.get(..7) == Some(month))
    }
}
