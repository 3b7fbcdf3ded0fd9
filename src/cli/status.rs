use expensedesk::db::{count_records, get_connection, RecordKind};
use expensedesk::error::Result;
use expensedesk::settings::{get_db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = get_db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;
        println!();
        println!("Imports:   {imports}");
        println!("Receipts:  {}", count_records(&conn, RecordKind::Receipts)?);
        println!("Users:     {}", count_records(&conn, RecordKind::Users)?);
    } else {
        println!();
        println!("Database not found. Run `expensedesk init` to set up.");
    }

    Ok(())
}
