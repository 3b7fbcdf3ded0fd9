//! Receipt expense dashboards.
//!
//! Raw receipt rows arrive with inconsistent column names, quote-polluted
//! status strings and optional owner ids. [`resolver`] turns each row into a
//! [`NormalizedReceipt`], [`directory`] joins display names from the user
//! table, and [`aggregate`] / [`summary`] derive the CFO and employee
//! dashboards. Everything in those modules is pure; [`db`] and [`importer`]
//! are the local fetch layer the CLI sits on.

pub mod aggregate;
pub mod db;
pub mod directory;
pub mod error;
pub mod fmt;
pub mod importer;
pub mod models;
pub mod register;
pub mod resolver;
pub mod settings;
pub mod status;
pub mod summary;

pub use aggregate::{compute_bulk_dashboard, BulkDashboard};
pub use directory::Directory;
pub use error::{ExpenseError, Result};
pub use models::{NormalizedReceipt, RawRecord, ReceiptStatus};
pub use register::{list_receipts, RegisterPage, RegisterQuery};
pub use resolver::resolve_receipt;
pub use status::normalize_status;
pub use summary::{compute_employee_dashboard, EmployeeSummary};
