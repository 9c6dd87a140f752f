//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tasktime_core` linkage.
//! - Optionally print a one-line rollup per project from a tracker database.
//!
//! Usage: `tasktime_cli [db_path]`

use std::process::ExitCode;
use tasktime_core::{format_duration, open_db, SqliteTrackerRepository, TrackerService};

fn main() -> ExitCode {
    println!("tasktime_core ping={}", tasktime_core::ping());
    println!("tasktime_core version={}", tasktime_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match print_overview(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tasktime_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_overview(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let service = TrackerService::new(SqliteTrackerRepository::try_new(&conn)?);
    let projects = service.try_list_projects()?;

    println!("projects={}", projects.len());
    for summary in projects {
        println!(
            "{} {} time={} tasks={}",
            summary.project.id,
            summary.project.name,
            format_duration(summary.rollup.total_time_ms),
            summary.rollup.total_tasks
        );
    }
    Ok(())
}
