use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ExpenseError;
use crate::models::{NormalizedReceipt, ReceiptStatus};

pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Amount,
    Vendor,
    Employee,
    Status,
}

impl FromStr for SortKey {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "vendor" | "merchant" => Ok(Self::Vendor),
            "employee" => Ok(Self::Employee),
            "status" => Ok(Self::Status),
            other => Err(ExpenseError::Other(format!(
                "Unknown sort key: {other} (expected date, amount, vendor, employee, status)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct RegisterQuery {
    pub status: Option<ReceiptStatus>,
    pub merchant: Option<String>,
    pub employee: Option<String>,
    pub sort: Option<(SortKey, SortDirection)>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for RegisterQuery {
    fn default() -> Self {
        Self {
            status: None,
            merchant: None,
            employee: None,
            sort: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterPage {
    pub rows: Vec<NormalizedReceipt>,
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub merchants: Vec<String>,
    pub employees: Vec<String>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn compare(a: &NormalizedReceipt, b: &NormalizedReceipt, key: SortKey) -> Ordering {
    match key {
        // undated rows sort as the earliest
        SortKey::Date => a.effective_date.cmp(&b.effective_date),
        SortKey::Amount => a.amount.total_cmp(&b.amount),
        SortKey::Vendor => a.vendor.to_lowercase().cmp(&b.vendor.to_lowercase()),
        SortKey::Employee => a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Filtered, sorted page of attributable receipts.
pub fn list_receipts(receipts: &[NormalizedReceipt], query: &RegisterQuery) -> RegisterPage {
    let attributable: Vec<&NormalizedReceipt> =
        receipts.iter().filter(|r| r.is_attributable()).collect();

    let merchants = distinct_sorted(attributable.iter().map(|r| r.vendor.as_str()));
    let employees = distinct_sorted(attributable.iter().map(|r| r.display_name.as_str()));

    let merchant = query.merchant.as_deref().filter(|m| !m.is_empty());
    let employee = query.employee.as_deref().filter(|e| !e.is_empty());
    let mut rows: Vec<&NormalizedReceipt> = attributable
        .into_iter()
        .filter(|r| query.status.map_or(true, |s| r.status == s))
        .filter(|r| merchant.map_or(true, |m| contains_ci(&r.vendor, m)))
        .filter(|r| employee.map_or(true, |e| contains_ci(&r.display_name, e)))
        .collect();

    if let Some((key, direction)) = query.sort {
        rows.sort_by(|a, b| {
            let ord = compare(a, b, key);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    let per_page = query.per_page.max(1);
    let page = query.page.max(1);
    let total_rows = rows.len();
    let total_pages = total_rows.div_ceil(per_page);
    let rows = rows
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect();

    RegisterPage {
        rows,
        page,
        total_pages,
        total_rows,
        merchants,
        employees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{join, Directory};
    use crate::models::RawRecord;

    fn feed() -> Vec<NormalizedReceipt> {
        let users = vec![
            RawRecord::new().with("Id", 1).with("Name", "Erin Employee"),
            RawRecord::new().with("Id", 2).with("Name", "Jordan Ops"),
        ];
        let raw = vec![
            RawRecord::new().with("UserID", 1).with("MerchantName", "Uber").with("TotalAmount", 25.0)
                .with("Status", "\"Approved\"").with("TransactionDate", "2025-01-03"),
            RawRecord::new().with("UserID", 2).with("MerchantName", "Delta Airlines").with("TotalAmount", 410.0)
                .with("Status", "Pending").with("TransactionDate", "2025-01-01"),
            RawRecord::new().with("UserID", 1).with("MerchantName", "Starbucks").with("TotalAmount", 6.5)
                .with("Status", "rejected").with("TransactionDate", "2025-01-02")
                .with("ApprovalDate", "2025-01-09"),
            RawRecord::new().with("MerchantName", "Orphan").with("TotalAmount", 1.0)
                .with("Status", "approved"),
        ];
        join(&raw, &Directory::build(&users))
    }

    fn vendors(page: &RegisterPage) -> Vec<&str> {
        page.rows.iter().map(|r| r.vendor.as_str()).collect()
    }

    #[test]
    fn test_default_lists_attributable_in_feed_order() {
        let page = list_receipts(&feed(), &RegisterQuery::default());
        assert_eq!(vendors(&page), vec!["Uber", "Delta Airlines", "Starbucks"]);
        assert_eq!(page.total_rows, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.merchants, vec!["Delta Airlines", "Starbucks", "Uber"]);
        assert_eq!(page.employees, vec!["Erin Employee", "Jordan Ops"]);
    }

    #[test]
    fn test_filters() {
        let feed = feed();
        let q = RegisterQuery { status: Some(ReceiptStatus::Approved), ..Default::default() };
        assert_eq!(vendors(&list_receipts(&feed, &q)), vec!["Uber"]);

        let q = RegisterQuery { merchant: Some("DELTA".into()), ..Default::default() };
        assert_eq!(vendors(&list_receipts(&feed, &q)), vec!["Delta Airlines"]);

        let q = RegisterQuery { employee: Some("erin".into()), ..Default::default() };
        assert_eq!(vendors(&list_receipts(&feed, &q)), vec!["Uber", "Starbucks"]);
    }

    #[test]
    fn test_sort_by_display_date_and_amount() {
        let feed = feed();
        let q = RegisterQuery { sort: Some((SortKey::Date, SortDirection::Desc)), ..Default::default() };
        assert_eq!(vendors(&list_receipts(&feed, &q)), vec!["Starbucks", "Uber", "Delta Airlines"]);

        let q = RegisterQuery { sort: Some((SortKey::Amount, SortDirection::Asc)), ..Default::default() };
        assert_eq!(vendors(&list_receipts(&feed, &q)), vec!["Starbucks", "Uber", "Delta Airlines"]);
    }

    #[test]
    fn test_pagination() {
        let feed = feed();
        let q = RegisterQuery { per_page: 2, page: 2, ..Default::default() };
        let page = list_receipts(&feed, &q);
        assert_eq!(vendors(&page), vec!["Starbucks"]);
        assert_eq!(page.total_pages, 2);

        let q = RegisterQuery { per_page: 2, page: 5, ..Default::default() };
        assert!(list_receipts(&feed, &q).rows.is_empty());

        let q = RegisterQuery { per_page: 2, page: usize::MAX, ..Default::default() };
        let page = list_receipts(&feed, &q);
        assert!(page.rows.is_empty());
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.total_rows, 3);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("Amount".parse::<SortKey>().unwrap(), SortKey::Amount);
        assert_eq!("merchant".parse::<SortKey>().unwrap(), SortKey::Vendor);
        assert!("colour".parse::<SortKey>().is_err());
    }
}
