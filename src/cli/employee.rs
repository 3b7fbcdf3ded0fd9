use colored::Colorize;
use comfy_table::{Cell, Table};

use expensedesk::db::fetch_receipts;
use expensedesk::error::Result;
use expensedesk::fmt::{money, month_label, or_dash};
use expensedesk::summary::compute_employee_dashboard;

use super::{open_db, parse_as_of, status_cell};

pub fn run(subject: &str, as_of: Option<String>, json: bool) -> Result<()> {
    let as_of = parse_as_of(&as_of)?;
    let conn = open_db()?;
    let receipts = fetch_receipts(&conn)?;
    let summary = compute_employee_dashboard(&receipts, subject, as_of);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {}", "Employee:".bold(), subject);
    println!("Approved spend, {}: {}", month_label(as_of), money(summary.monthly_total));
    println!(
        "{} approved, {} pending, {} rejected",
        summary.approved_count.to_string().green(),
        summary.pending_count.to_string().yellow(),
        summary.rejected_count.to_string().red(),
    );

    if summary.recent_receipts.is_empty() {
        println!("\nNo receipts found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Vendor", "Amount", "Status"]);
    for r in &summary.recent_receipts {
        table.add_row(vec![
            Cell::new(or_dash(r.transaction_date.as_deref())),
            Cell::new(&r.vendor),
            Cell::new(money(r.amount)),
            Cell::new(status_cell(r.status)),
        ]);
    }
    println!("\nRecent Receipts\n{table}");
    Ok(())
}
