mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

/// Logs go to stderr so `--json` output on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("EXPENSEDESK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import { file, kind } => cli::import::run(&file, kind),
        Commands::Dashboard { as_of, json } => cli::dashboard::run(as_of, json),
        Commands::Employee {
            subject,
            as_of,
            json,
        } => cli::employee::run(&subject, as_of, json),
        Commands::Receipts {
            status,
            merchant,
            employee,
            sort,
            desc,
            page,
            per_page,
            json,
        } => cli::receipts::run(status, merchant, employee, sort, desc, page, per_page, json),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
