use std::io::{BufRead, Write};
use std::path::PathBuf;

use expensedesk::db::{get_connection, init_db, DB_FILE};
use expensedesk::error::Result;
use expensedesk::settings::{expand_path, load_settings, save_settings, settings_exist};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let stdin = std::io::stdin();
    let chosen = choose_data_dir(
        data_dir.as_deref(),
        &settings.data_dir,
        !settings_exist(),
        stdin.lock(),
    )?;
    settings.data_dir = chosen.to_string_lossy().into_owned();
    save_settings(&settings)?;

    std::fs::create_dir_all(&chosen)?;
    let conn = get_connection(&chosen.join(DB_FILE))?;
    init_db(&conn)?;

    println!("Initialized expensedesk at {}", chosen.display());
    Ok(())
}

/// `--data-dir` wins. Without it, a first run asks once and a blank answer
/// keeps `current`; later runs keep `current` silently.
fn choose_data_dir(
    flag: Option<&str>,
    current: &str,
    first_run: bool,
    mut input: impl BufRead,
) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(expand_path(dir));
    }
    if !first_run {
        return Ok(PathBuf::from(current));
    }

    print!("Data directory [{current}]: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(match answer.trim() {
        "" => PathBuf::from(current),
        chosen => expand_path(chosen),
    })
}
