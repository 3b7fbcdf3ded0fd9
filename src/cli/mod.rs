pub mod dashboard;
pub mod employee;
pub mod import;
pub mod init;
pub mod receipts;
pub mod status;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use rusqlite::Connection;

use expensedesk::db::{get_connection, RecordKind};
use expensedesk::error::{ExpenseError, Result};
use expensedesk::settings::get_db_path;
use expensedesk::ReceiptStatus;

/// `--as-of` when given, otherwise today (UTC).
pub(crate) fn parse_as_of(as_of: &Option<String>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| ExpenseError::InvalidDate(s.clone())),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}

pub(crate) fn open_db() -> Result<Connection> {
    let path = get_db_path();
    if !path.exists() {
        return Err(ExpenseError::Other(format!(
            "Database not found at {}. Run `expensedesk init` to set up.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub(crate) fn status_cell(status: ReceiptStatus) -> ColoredString {
    match status {
        ReceiptStatus::Approved => status.label().green(),
        ReceiptStatus::Pending => status.label().yellow(),
        ReceiptStatus::Rejected => status.label().red(),
        ReceiptStatus::Unknown => status.label().dimmed(),
    }
}

#[derive(Parser)]
#[command(name = "expensedesk", about = "Receipt expense dashboards for employees and finance.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Receipts,
    Users,
}

impl From<KindArg> for RecordKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Receipts => RecordKind::Receipts,
            KindArg::Users => RecordKind::Users,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Approved,
    Pending,
    Rejected,
    Unknown,
}

impl From<StatusArg> for ReceiptStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Approved => ReceiptStatus::Approved,
            StatusArg::Pending => ReceiptStatus::Pending,
            StatusArg::Rejected => ReceiptStatus::Rejected,
            StatusArg::Unknown => ReceiptStatus::Unknown,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for data (default: ~/Documents/expensedesk)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a JSON or CSV export of the receipts or users table.
    Import {
        /// Path to a .json or .csv export
        file: String,
        /// Which table the rows belong to
        #[arg(long, value_enum, default_value = "receipts")]
        kind: KindArg,
    },
    /// Company-wide dashboard: vendor spend, daily trend, approvals, monthly spend.
    Dashboard {
        /// Evaluation date: YYYY-MM-DD (default: today)
        #[arg(long = "as-of")]
        as_of: Option<String>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Dashboard for one employee, by user id or name.
    Employee {
        /// User id or name
        subject: String,
        /// Evaluation date: YYYY-MM-DD (default: today)
        #[arg(long = "as-of")]
        as_of: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List receipts with filters, sorting and paging.
    Receipts {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Merchant name contains (case-insensitive)
        #[arg(long)]
        merchant: Option<String>,
        /// Employee name contains (case-insensitive)
        #[arg(long)]
        employee: Option<String>,
        /// Sort key: date, amount, vendor, employee, status
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page (default from settings)
        #[arg(long = "per-page")]
        per_page: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show data directory and row counts.
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_as_of() {
        let d = parse_as_of(&Some("2025-01-20".to_string())).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
        assert!(parse_as_of(&Some("01/20/2025".to_string())).is_err());
        assert!(parse_as_of(&None).is_ok());
    }
}
