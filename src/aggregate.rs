use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::directory::{join, Directory};
use crate::error::{ExpenseError, Result};
use crate::models::{NormalizedReceipt, RawRecord, ReceiptStatus};

pub const TOP_VENDORS: usize = 10;
pub const TREND_BUCKETS: usize = 30;

pub fn round_cents(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Output series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorSpend {
    pub vendor: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalBreakdown {
    pub employee: String,
    pub approved: u64,
    pub pending: u64,
    pub rejected: u64,
}

impl ApprovalBreakdown {
    pub fn total(&self) -> u64 {
        self.approved + self.pending + self.rejected
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSpend {
    pub employee: String,
    pub spend: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkDashboard {
    pub vendor_spend: Vec<VendorSpend>,
    pub daily_trend: Vec<DailyTotal>,
    pub approval_breakdown: Vec<ApprovalBreakdown>,
    pub monthly_spend: Vec<EmployeeSpend>,
}

impl BulkDashboard {
    pub fn is_empty(&self) -> bool {
        self.vendor_spend.is_empty()
            && self.daily_trend.is_empty()
            && self.approval_breakdown.is_empty()
            && self.monthly_spend.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Grouping helpers
// ---------------------------------------------------------------------------

/// Sum amounts per key, keeping first-encounter order of keys.
fn group_sum<'a>(items: impl Iterator<Item = (&'a str, f64)>) -> Vec<(String, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, f64)> = Vec::new();
    for (key, amount) in items {
        match index.get(key) {
            Some(&i) => groups[i].1 += amount,
            None => {
                index.insert(key, groups.len());
                groups.push((key.to_string(), amount));
            }
        }
    }
    groups
}

fn round_groups(series: &'static str, groups: Vec<(String, f64)>) -> Result<Vec<(String, f64)>> {
    groups
        .into_iter()
        .map(|(key, total)| {
            if total.is_finite() {
                Ok((key, round_cents(total)))
            } else {
                Err(ExpenseError::NonFiniteTotal { series, key })
            }
        })
        .collect()
}

fn sort_desc(groups: &mut [(String, f64)]) {
    // sort_by is stable: ties keep encounter order
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
}

fn isolate<T>(series: &'static str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(series, error = %e, "series degraded to empty");
        Vec::new()
    })
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Approved spend per vendor, top 10 by amount. Attribution is not required.
pub fn vendor_spend(receipts: &[NormalizedReceipt]) -> Result<Vec<VendorSpend>> {
    let groups = group_sum(
        receipts
            .iter()
            .filter(|r| r.is_approved())
            .map(|r| (r.vendor.as_str(), r.amount)),
    );
    let mut groups = round_groups("vendor_spend", groups)?;
    sort_desc(&mut groups);
    Ok(groups
        .into_iter()
        .take(TOP_VENDORS)
        .map(|(vendor, amount)| VendorSpend { vendor, amount })
        .collect())
}

/// Approved spend per effective date, ascending, most recent 30 buckets.
pub fn daily_trend(receipts: &[NormalizedReceipt]) -> Result<Vec<DailyTotal>> {
    let groups = group_sum(
        receipts
            .iter()
            .filter(|r| r.is_approved())
            .filter_map(|r| r.effective_date.as_deref().map(|d| (d, r.amount))),
    );
    let mut groups = round_groups("daily_trend", groups)?;
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    let skip = groups.len().saturating_sub(TREND_BUCKETS);
    Ok(groups
        .into_iter()
        .skip(skip)
        .map(|(date, amount)| DailyTotal { date, amount })
        .collect())
}

/// Status counts per employee over attributable receipts. Unknown status is
/// counted as pending.
pub fn approval_breakdown(receipts: &[NormalizedReceipt]) -> Result<Vec<ApprovalBreakdown>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<ApprovalBreakdown> = Vec::new();
    for r in receipts.iter().filter(|r| r.is_attributable()) {
        let i = *index.entry(r.display_name.as_str()).or_insert_with(|| {
            rows.push(ApprovalBreakdown {
                employee: r.display_name.clone(),
                approved: 0,
                pending: 0,
                rejected: 0,
            });
            rows.len() - 1
        });
        let row = &mut rows[i];
        match r.status {
            ReceiptStatus::Approved => row.approved += 1,
            ReceiptStatus::Rejected => row.rejected += 1,
            ReceiptStatus::Pending | ReceiptStatus::Unknown => row.pending += 1,
        }
    }
    rows.sort_by(|a, b| b.total().cmp(&a.total()));
    Ok(rows)
}

/// Approved, attributable spend per employee for the calendar month of `as_of`.
pub fn monthly_spend(receipts: &[NormalizedReceipt], as_of: NaiveDate) -> Result<Vec<EmployeeSpend>> {
    let month = as_of.format("%Y-%m").to_string();
    let groups = group_sum(
        receipts
            .iter()
            .filter(|r| r.is_approved() && r.is_attributable() && r.in_month(&month))
            .map(|r| (r.display_name.as_str(), r.amount)),
    );
    let mut groups = round_groups("monthly_spend", groups)?;
    sort_desc(&mut groups);
    Ok(groups
        .into_iter()
        .map(|(employee, spend)| EmployeeSpend { employee, spend })
        .collect())
}

// ---------------------------------------------------------------------------
// Bulk dashboard
// ---------------------------------------------------------------------------

/// All four series over already-joined receipts. A series that fails is
/// logged and comes back empty; the others are unaffected.
pub fn aggregate(receipts: &[NormalizedReceipt], as_of: NaiveDate) -> BulkDashboard {
    BulkDashboard {
        vendor_spend: isolate("vendor_spend", vendor_spend(receipts)),
        daily_trend: isolate("daily_trend", daily_trend(receipts)),
        approval_breakdown: isolate("approval_breakdown", approval_breakdown(receipts)),
        monthly_spend: isolate("monthly_spend", monthly_spend(receipts, as_of)),
    }
}

pub fn compute_bulk_dashboard(
    receipts: &[RawRecord],
    users: &[RawRecord],
    as_of: NaiveDate,
) -> BulkDashboard {
    let directory = Directory::build(users);
    aggregate(&join(receipts, &directory), as_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(owner: Option<&str>, vendor: &str, amount: f64, status: &str, date: &str) -> RawRecord {
        let mut raw = RawRecord::new()
            .with("MerchantName", vendor)
            .with("TotalAmount", amount)
            .with("Status", status)
            .with("TransactionDate", date);
        if let Some(o) = owner {
            raw = raw.with("UserID", o);
        }
        raw
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(10.005 + 0.0001), 10.01);
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_cents(-4.444), -4.44);
    }

    #[test]
    fn test_mixed_feed_scenario() {
        let receipts = vec![
            receipt(Some("1"), "A", 100.0, "\"Approved\"", "2025-01-05T00:00:00Z"),
            receipt(Some("1"), "A", 50.0, "approved", "2025-01-06T00:00:00Z"),
            receipt(None, "B", 999.0, "approved", "2025-01-06T00:00:00Z"),
        ];
        let dash = compute_bulk_dashboard(&receipts, &[], as_of());

        assert_eq!(
            dash.vendor_spend,
            vec![
                VendorSpend { vendor: "B".into(), amount: 999.0 },
                VendorSpend { vendor: "A".into(), amount: 150.0 },
            ]
        );
        assert_eq!(dash.approval_breakdown.len(), 1);
        assert_eq!(dash.approval_breakdown[0].approved, 2);
        assert_eq!(dash.approval_breakdown[0].employee, "Unknown");
        assert_eq!(
            dash.daily_trend,
            vec![
                DailyTotal { date: "2025-01-05".into(), amount: 100.0 },
                DailyTotal { date: "2025-01-06".into(), amount: 1049.0 },
            ]
        );
        assert_eq!(
            dash.monthly_spend,
            vec![EmployeeSpend { employee: "Unknown".into(), spend: 150.0 }]
        );
    }

    #[test]
    fn test_vendor_ties_keep_encounter_order() {
        let receipts = vec![
            receipt(Some("1"), "Zeta", 10.0, "approved", "2025-01-01"),
            receipt(Some("1"), "Alpha", 10.0, "approved", "2025-01-01"),
            receipt(Some("1"), "Mid", 20.0, "approved", "2025-01-01"),
        ];
        let dash = compute_bulk_dashboard(&receipts, &[], as_of());
        let names: Vec<&str> = dash.vendor_spend.iter().map(|v| v.vendor.as_str()).collect();
        assert_eq!(names, vec!["Mid", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_vendor_ranking_truncates_to_ten() {
        let receipts: Vec<RawRecord> = (0..15)
            .map(|i| receipt(Some("1"), &format!("V{i}"), i as f64, "approved", "2025-01-01"))
            .collect();
        let dash = compute_bulk_dashboard(&receipts, &[], as_of());
        assert_eq!(dash.vendor_spend.len(), 10);
        assert_eq!(dash.vendor_spend[0].vendor, "V14");
        assert_eq!(dash.vendor_spend[9].vendor, "V5");
    }

    #[test]
    fn test_only_approved_counts_toward_spend() {
        let receipts = vec![
            receipt(Some("1"), "A", 10.0, "pending", "2025-01-01"),
            receipt(Some("1"), "A", 20.0, "rejected", "2025-01-01"),
            receipt(Some("1"), "A", 30.0, "Processing", "2025-01-01"),
        ];
        let dash = compute_bulk_dashboard(&receipts, &[], as_of());
        assert!(dash.vendor_spend.is_empty());
        assert!(dash.daily_trend.is_empty());
        assert!(dash.monthly_spend.is_empty());
        assert_eq!(dash.approval_breakdown[0].pending, 2);
        assert_eq!(dash.approval_breakdown[0].rejected, 1);
    }

    #[test]
    fn test_trend_keeps_latest_thirty_days() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let receipts: Vec<RawRecord> = (0..40)
            .map(|i| {
                let d = start + chrono::Duration::days(i);
                receipt(None, "A", 1.0, "approved", &d.format("%Y-%m-%d").to_string())
            })
            .rev()
            .collect();
        let trend = daily_trend(&compute(&receipts)).unwrap();
        assert_eq!(trend.len(), 30);
        assert_eq!(trend[0].date, "2024-12-11");
        assert_eq!(trend[29].date, "2025-01-09");
    }

    #[test]
    fn test_trend_uses_approval_date_and_skips_undated() {
        let receipts = vec![
            receipt(None, "A", 5.0, "approved", "2025-01-01").with("ApprovalDate", "2025-01-03"),
            RawRecord::new().with("Status", "approved").with("TotalAmount", 7),
        ];
        let trend = daily_trend(&compute(&receipts)).unwrap();
        assert_eq!(trend, vec![DailyTotal { date: "2025-01-03".into(), amount: 5.0 }]);
    }

    #[test]
    fn test_breakdown_sorted_by_activity() {
        let users = vec![
            RawRecord::new().with("Id", 1).with("Name", "Erin"),
            RawRecord::new().with("Id", 2).with("Name", "Jordan"),
        ];
        let receipts = vec![
            receipt(Some("1"), "A", 1.0, "approved", "2025-01-01"),
            receipt(Some("2"), "A", 1.0, "pending", "2025-01-01"),
            receipt(Some("2"), "A", 1.0, "", "2025-01-01"),
            receipt(Some("2"), "A", 1.0, "rejected", "2025-01-01"),
        ];
        let dash = compute_bulk_dashboard(&receipts, &users, as_of());
        assert_eq!(
            dash.approval_breakdown,
            vec![
                ApprovalBreakdown { employee: "Jordan".into(), approved: 0, pending: 2, rejected: 1 },
                ApprovalBreakdown { employee: "Erin".into(), approved: 1, pending: 0, rejected: 0 },
            ]
        );
    }

    #[test]
    fn test_monthly_spend_window() {
        let users = vec![RawRecord::new().with("Id", 1).with("Name", "Erin")];
        let receipts = vec![
            receipt(Some("1"), "A", 10.10, "approved", "2025-01-02"),
            receipt(Some("1"), "A", 20.20, "approved", "2024-12-31"),
            // approved in January even though purchased in December
            receipt(Some("1"), "A", 5.0, "approved", "2024-12-30").with("ApprovalDate", "2025-01-01"),
            receipt(None, "A", 99.0, "approved", "2025-01-02"),
        ];
        let dash = compute_bulk_dashboard(&receipts, &users, as_of());
        assert_eq!(dash.monthly_spend, vec![EmployeeSpend { employee: "Erin".into(), spend: 15.1 }]);
    }

    #[test]
    fn test_non_finite_total_degrades_only_its_series() {
        let huge = |owner: &str| {
            RawRecord::new()
                .with("UserID", owner)
                .with("MerchantName", "B")
                .with("TotalAmount", f64::MAX)
                .with("Status", "approved")
        };
        let receipts = vec![
            receipt(Some("1"), "A", 10.0, "approved", "2025-01-02"),
            huge("1"),
            huge("2"),
        ];
        let dash = compute_bulk_dashboard(&receipts, &[], as_of());
        assert!(dash.vendor_spend.is_empty());
        // undated rows never reach the trend or the month
        assert_eq!(dash.daily_trend.len(), 1);
        assert_eq!(dash.approval_breakdown[0].approved, 3);
        assert_eq!(dash.monthly_spend[0].spend, 10.0);
    }

    #[test]
    fn test_infinite_amount_text_counts_as_zero() {
        let receipts = vec![
            receipt(Some("1"), "A", 40.0, "approved", "2025-01-06"),
            RawRecord::new()
                .with("UserID", "2")
                .with("MerchantName", "B")
                .with("TotalAmount", "inf")
                .with("Status", "approved")
                .with("TransactionDate", "2025-01-06"),
        ];
        let dash = compute_bulk_dashboard(&receipts, &[], as_of());
        assert_eq!(
            dash.vendor_spend,
            vec![
                VendorSpend { vendor: "A".into(), amount: 40.0 },
                VendorSpend { vendor: "B".into(), amount: 0.0 },
            ]
        );
        assert_eq!(dash.daily_trend, vec![DailyTotal { date: "2025-01-06".into(), amount: 40.0 }]);
        assert_eq!(
            dash.monthly_spend,
            vec![EmployeeSpend { employee: "Unknown".into(), spend: 40.0 }]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        let dash = compute_bulk_dashboard(&[], &[], as_of());
        assert!(dash.is_empty());
    }

    fn compute(receipts: &[RawRecord]) -> Vec<NormalizedReceipt> {
        join(receipts, &Directory::default())
    }
}
