use std::path::PathBuf;

use expensedesk::db::init_db;
use expensedesk::error::Result;
use expensedesk::importer::import_file;

use super::{open_db, KindArg};

pub fn run(file: &str, kind: KindArg) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = open_db()?;
    init_db(&conn)?;

    let result = import_file(&conn, &file_path, kind.into())?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!("{} rows imported", result.imported);
    Ok(())
}
