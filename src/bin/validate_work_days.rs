// Small ops utility: compare work_days.json against working_days.json.
//
// Usage:
//   cargo run --bin validate_work_days -- [data_dir]
//
// Exits with status 1 when any month is mismatched or undefined.

use std::path::PathBuf;
use std::sync::Arc;

use daily_report::config::default_data_dir;
use daily_report::engine::{validate_work_days, MonthCheckStatus};
use daily_report::repository::{FileStorage, WorkDayRepository, WorkingDayRepository};

fn main() -> anyhow::Result<()> {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var("DAILY_REPORT_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(default_data_dir);

    let storage = Arc::new(FileStorage::new(&data_dir)?);
    let counts = WorkDayRepository::new(storage.clone()).get_work_days()?;
    let dates = WorkingDayRepository::new(storage).list()?;
    let report = validate_work_days(&counts, &dates);

    println!("Validating {}", data_dir.display());
    for check in &report.months {
        let expected = check
            .expected
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mark = match check.status {
            MonthCheckStatus::Ok => "OK",
            MonthCheckStatus::Mismatch => "MISMATCH",
            MonthCheckStatus::Undefined => "UNDEFINED",
        };
        println!(
            "{}: expected {}, found {} [{}]",
            check.year_month, expected, check.found, mark
        );
    }

    if report.valid {
        println!("All months consistent.");
        Ok(())
    } else {
        let problems = report.problems().count();
        eprintln!("{} month(s) need attention.", problems);
        std::process::exit(1);
    }
}
