use chrono::Datelike;
use clap::Subcommand;
use fieldlog_core::storage::Database;
use fieldlog_core::{Config, MonthTotals};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ActivityAction {
    /// List activity entries for a month (defaults to the current one)
    List {
        #[arg(long)]
        year: Option<i32>,
        /// Month number, 1-12
        #[arg(long)]
        month: Option<u32>,
    },
    /// Monthly totals with goal progress
    Totals {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
}

/// Totals for one month next to the configured goal.
#[derive(Serialize)]
struct MonthReport {
    year: i32,
    month: u32,
    totals: MonthTotals,
    goal_hours: u32,
}

fn month_or_now(year: Option<i32>, month: Option<u32>) -> (i32, u32) {
    let today = chrono::Local::now().date_naive();
    (year.unwrap_or(today.year()), month.unwrap_or(today.month()))
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ActivityAction::List { year, month } => {
            let (year, month) = month_or_now(year, month);
            let entries = db.list_month(year, month)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        ActivityAction::Totals { year, month } => {
            let (year, month) = month_or_now(year, month);
            let report = MonthReport {
                year,
                month,
                totals: db.month_totals(year, month)?,
                goal_hours: Config::load_or_default().goal_hours,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
