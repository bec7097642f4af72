use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use ravensheet::core::report;
use ravensheet::errors::Result;
use ravensheet::{api, config, db};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ravensheet", version, about = "Shop operations tracking for a fabrication business")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database file and all tables
    Init,
    /// Load the demo employees, jobs, and sections (safe to repeat)
    Seed,
    /// Probe process and database health
    Health,
    /// Print the weekly attendance summary as JSON
    Weekly {
        /// Any day inside the wanted week; defaults to today
        #[arg(long)]
        week: Option<NaiveDate>,
    },
    /// Export the weekly attendance summary as CSV
    ExportAttendance {
        /// Any day inside the wanted week; defaults to today
        #[arg(long)]
        week: Option<NaiveDate>,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export timesheets in a date range as CSV, one row per entry
    ExportTimesheets {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn emit_csv(csv: &str, out: Option<&PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, csv)?;
            info!("Wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;

    // 4. Initialize database (creates the file and tables on first use)
    let db_pool = db::init_db(&app_config.database_path)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    match cli.command {
        Command::Init => {
            // init_db above already did the work
            println!("Database ready at {}", app_config.database_path);
        }
        Command::Seed => {
            db::seed::seed_demo_data(&db_pool).await?;
            println!("Demo data loaded.");
        }
        Command::Health => {
            let report = api::health::health_check(&db_pool).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Weekly { week } => {
            let day = week.unwrap_or_else(|| Utc::now().date_naive());
            let summary = api::attendance::weekly_summary(&db_pool, day).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::ExportAttendance { week, out } => {
            let day = week.unwrap_or_else(|| Utc::now().date_naive());
            let summary = api::attendance::weekly_summary(&db_pool, day).await?;
            emit_csv(&report::weekly_attendance_csv(&summary), out.as_ref())?;
        }
        Command::ExportTimesheets { start, end, out } => {
            let details = api::timesheets::export_range(&db_pool, start, end).await?;
            emit_csv(&report::timesheets_csv(&details), out.as_ref())?;
        }
    }

    Ok(())
}
