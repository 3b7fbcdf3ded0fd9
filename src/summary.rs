use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::aggregate::round_cents;
use crate::directory::{join, Directory};
use crate::models::{NormalizedReceipt, RawRecord, ReceiptStatus};

pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub monthly_total: f64,
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub recent_receipts: Vec<NormalizedReceipt>,
}

/// A subject may be identified by user id or by name, depending on the caller.
fn belongs_to(r: &NormalizedReceipt, subject: &str) -> bool {
    r.owner_key.as_deref() == Some(subject) || r.name_hints.iter().any(|n| n == subject)
}

/// Most recent first; receipts without a transaction date sort last.
fn by_transaction_desc(a: &NormalizedReceipt, b: &NormalizedReceipt) -> Ordering {
    match (&a.transaction_at, &b.transaction_at) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn build_employee_summary(
    receipts: &[NormalizedReceipt],
    subject: &str,
    as_of: NaiveDate,
) -> EmployeeSummary {
    let subject = subject.trim();
    let month = as_of.format("%Y-%m").to_string();
    let mut mine: Vec<&NormalizedReceipt> = receipts
        .iter()
        .filter(|r| r.is_attributable() && belongs_to(r, subject))
        .collect();

    let monthly_total: f64 = mine
        .iter()
        .filter(|r| r.is_approved() && r.in_month(&month))
        .map(|r| r.amount)
        .sum();
    let count = |pred: fn(&ReceiptStatus) -> bool| mine.iter().filter(|r| pred(&r.status)).count();
    let pending_count = count(ReceiptStatus::folds_to_pending);
    let approved_count = count(|s| *s == ReceiptStatus::Approved);
    let rejected_count = count(|s| *s == ReceiptStatus::Rejected);

    mine.sort_by(|a, b| by_transaction_desc(a, b));
    let recent_receipts = mine.into_iter().take(RECENT_LIMIT).cloned().collect();

    let monthly_total = if monthly_total.is_finite() {
        round_cents(monthly_total)
    } else {
        warn!(subject, "monthly total overflowed; reporting 0");
        0.0
    };

    EmployeeSummary {
        monthly_total,
        pending_count,
        approved_count,
        rejected_count,
        recent_receipts,
    }
}

/// Single-employee dashboard straight from raw rows. Display names come from
/// receipt hints only; the employee view never loads the user table.
pub fn compute_employee_dashboard(
    receipts: &[RawRecord],
    subject: &str,
    as_of: NaiveDate,
) -> EmployeeSummary {
    build_employee_summary(&join(receipts, &Directory::default()), subject, as_of)
}
