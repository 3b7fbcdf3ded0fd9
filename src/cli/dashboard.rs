use colored::Colorize;
use comfy_table::{Cell, Table};

use expensedesk::aggregate::compute_bulk_dashboard;
use expensedesk::db::{fetch_receipts, fetch_users_best_effort};
use expensedesk::error::Result;
use expensedesk::fmt::{money, month_label};

use super::{open_db, parse_as_of};

pub fn run(as_of: Option<String>, json: bool) -> Result<()> {
    let as_of = parse_as_of(&as_of)?;
    let conn = open_db()?;
    let receipts = fetch_receipts(&conn)?;
    let users = fetch_users_best_effort(&conn);
    let dash = compute_bulk_dashboard(&receipts, &users, as_of);

    if json {
        println!("{}", serde_json::to_string_pretty(&dash)?);
        return Ok(());
    }

    if dash.is_empty() {
        println!("No data available.");
        println!("Receipts will appear here once they are processed and approved.");
        return Ok(());
    }

    let mut vendors = Table::new();
    vendors.set_header(vec!["Vendor", "Spend"]);
    for v in &dash.vendor_spend {
        vendors.add_row(vec![Cell::new(&v.vendor), Cell::new(money(v.amount))]);
    }
    println!("{}\n{vendors}", "Total Spend by Vendor".bold());

    let mut trend = Table::new();
    trend.set_header(vec!["Date", "Amount"]);
    for d in &dash.daily_trend {
        trend.add_row(vec![Cell::new(&d.date), Cell::new(money(d.amount))]);
    }
    println!("\n{}\n{trend}", "Daily Expense Trend".bold());

    let mut approvals = Table::new();
    approvals.set_header(vec!["Employee", "Approved", "Pending", "Rejected", "Total"]);
    for a in &dash.approval_breakdown {
        approvals.add_row(vec![
            Cell::new(&a.employee),
            Cell::new(a.approved.to_string().green()),
            Cell::new(a.pending.to_string().yellow()),
            Cell::new(a.rejected.to_string().red()),
            Cell::new(a.total()),
        ]);
    }
    println!("\n{}\n{approvals}", "Approval Status by Employee".bold());

    if dash.monthly_spend.is_empty() {
        println!("\nNo approved spend for {}.", month_label(as_of));
    } else {
        let mut monthly = Table::new();
        monthly.set_header(vec!["Employee", "Spend"]);
        for m in &dash.monthly_spend {
            monthly.add_row(vec![Cell::new(&m.employee), Cell::new(money(m.spend))]);
        }
        println!("\n{}\n{monthly}", format!("Employee Spend, {}", month_label(as_of)).as_str().bold());
    }
    Ok(())
}
