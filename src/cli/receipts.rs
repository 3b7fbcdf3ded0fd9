use comfy_table::{Cell, Table};

use expensedesk::db::{fetch_receipts, fetch_users_best_effort};
use expensedesk::directory::{join, Directory};
use expensedesk::error::Result;
use expensedesk::fmt::{money, or_dash};
use expensedesk::register::{list_receipts, RegisterQuery, SortDirection, SortKey};
use expensedesk::settings::load_settings;

use super::{open_db, status_cell, StatusArg};

#[allow(clippy::too_many_arguments)]
pub fn run(
    status: Option<StatusArg>,
    merchant: Option<String>,
    employee: Option<String>,
    sort: Option<String>,
    desc: bool,
    page: usize,
    per_page: Option<usize>,
    json: bool,
) -> Result<()> {
    let sort = match sort {
        Some(key) => {
            let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
            Some((key.parse::<SortKey>()?, direction))
        }
        None => None,
    };
    let query = RegisterQuery {
        status: status.map(Into::into),
        merchant,
        employee,
        sort,
        page,
        per_page: per_page.unwrap_or_else(|| load_settings().per_page),
    };

    let conn = open_db()?;
    let receipts = fetch_receipts(&conn)?;
    let directory = Directory::build(&fetch_users_best_effort(&conn));
    let result = list_receipts(&join(&receipts, &directory), &query);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.total_rows == 0 {
        println!("No receipts found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Employee", "Vendor", "Amount", "Status"]);
    for r in &result.rows {
        table.add_row(vec![
            Cell::new(or_dash(r.effective_date.as_deref())),
            Cell::new(&r.display_name),
            Cell::new(&r.vendor),
            Cell::new(money(r.amount)),
            Cell::new(status_cell(r.status)),
        ]);
    }
    println!("Receipts\n{table}");
    println!(
        "Page {} of {} ({} receipts)",
        result.page,
        result.total_pages.max(1),
        result.total_rows
    );
    Ok(())
}
