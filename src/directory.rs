use std::collections::HashMap;

use tracing::debug;

use crate::models::{NormalizedReceipt, RawRecord};
use crate::resolver::resolve_receipt;

pub const USER_ID_FIELDS: &[&str] = &["Id", "id", "UserID", "UserId"];
pub const USER_NAME_FIELDS: &[&str] = &["Name", "FullName", "Username", "Email"];
pub const UNKNOWN_NAME: &str = "Unknown";

/// Display-name fields of one user, already trimmed and in preference order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUser {
    pub key: String,
    pub names: Vec<String>,
}

impl ResolvedUser {
    pub fn display_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}

/// Lookup from user identifier (string form) to display-name fields.
///
/// An empty directory is a valid directory: it is what callers pass when the
/// user fetch failed, and names then degrade to receipt hints.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: HashMap<String, ResolvedUser>,
}

impl Directory {
    pub fn build(users: &[RawRecord]) -> Self {
        let mut map = HashMap::new();
        for (idx, raw) in users.iter().enumerate() {
            let Some(key) = raw.first_text(USER_ID_FIELDS) else {
                debug!(row = idx, "user row has no identifier, skipped");
                continue;
            };
            let names = USER_NAME_FIELDS.iter().filter_map(|f| raw.text(f)).collect();
            map.entry(key.clone())
                .or_insert(ResolvedUser { key, names });
        }
        Self { users: map }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedUser> {
        self.users.get(key)
    }

    /// Directory name on a hit, else the first receipt hint, else "Unknown".
    /// Never falls back to the raw owner key.
    pub fn display_name(&self, owner_key: Option<&str>, hints: &[String]) -> String {
        owner_key
            .and_then(|k| self.users.get(k))
            .and_then(ResolvedUser::display_name)
            .or_else(|| hints.first().map(String::as_str))
            .unwrap_or(UNKNOWN_NAME)
            .to_string()
    }
}

/// Resolve every raw receipt and fill in its display name.
pub fn join(receipts: &[RawRecord], directory: &Directory) -> Vec<NormalizedReceipt> {
    receipts
        .iter()
        .map(|raw| {
            let mut r = resolve_receipt(raw);
            r.display_name = directory.display_name(r.owner_key.as_deref(), &r.name_hints);
            r
        })
        .collect()
}
