//! `px planning`: planning tasks of a project.

use crate::output::{OutputMode, or_dash, pretty_rule, render_mode};
use crate::session::Session;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use projex_core::db::SqliteFetcher;
use projex_core::db::projects;
use projex_core::db::query::PlanningQuery;
use projex_core::model::PlanningTask;
use std::io::Write;

#[derive(Args, Debug)]
pub struct PlanningArgs {
    /// Project number.
    pub number: String,

    /// Show the sub-tasks of this task instead of the top-level tasks.
    #[arg(long, value_name = "TASK_ID")]
    pub parent: Option<String>,
}

/// Execute `px planning`.
///
/// # Errors
///
/// Returns an error if the database is unavailable or the query fails.
pub fn run_planning(args: &PlanningArgs, session: &Session, output: OutputMode) -> Result<()> {
    let conn = session.connect()?;
    let fetcher = SqliteFetcher::new(&conn);

    let query = PlanningQuery {
        parent_id: args.parent.clone(),
        ..PlanningQuery::for_project(&args.number)
    };
    let tasks = projects::get_planning_tasks(&session.filters, &fetcher, &query)?;

    render_mode(
        output,
        &tasks,
        |tasks, w| {
            for task in tasks {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}",
                    task.task_id,
                    date(task.date_start),
                    date(task.date_finish),
                    date(task.date_delivery),
                    task.task_description.as_deref().unwrap_or_default(),
                )?;
            }
            Ok(())
        },
        |tasks, w| {
            writeln!(
                w,
                "{:<6} {:<11} {:<11} {:<11} DESCRIPTION",
                "TASK", "START", "FINISH", "DELIVERY"
            )?;
            pretty_rule(w)?;
            for task in tasks {
                writeln!(
                    w,
                    "{:<6} {:<11} {:<11} {:<11} {}",
                    task.task_id,
                    dash_date(planned_start(task)),
                    dash_date(planned_finish(task)),
                    dash_date(task.date_delivery),
                    or_dash(task.task_description.as_deref()),
                )?;
            }
            Ok(())
        },
    )
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn dash_date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "-".to_string(), |d| d.to_string())
}

/// Actual start when recorded, otherwise the planned one.
const fn planned_start(task: &PlanningTask) -> Option<NaiveDate> {
    match task.date_start_actual {
        Some(actual) => Some(actual),
        None => task.date_start,
    }
}

/// Actual finish when recorded, otherwise the planned one.
const fn planned_finish(task: &PlanningTask) -> Option<NaiveDate> {
    match task.date_finish_actual {
        Some(actual) => Some(actual),
        None => task.date_finish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> PlanningTask {
        PlanningTask {
            task_id: "1".into(),
            parent_id: None,
            project_id: Some("2".into()),
            project_number: "P-0042".into(),
            task_description: Some("Engineering".into()),
            date_start: NaiveDate::from_ymd_opt(2024, 1, 15),
            date_start_actual: NaiveDate::from_ymd_opt(2024, 1, 17),
            date_finish: NaiveDate::from_ymd_opt(2024, 2, 28),
            date_finish_actual: None,
            date_delivery: None,
        }
    }

    #[test]
    fn actual_dates_take_precedence() {
        assert_eq!(planned_start(&task()), NaiveDate::from_ymd_opt(2024, 1, 17));
        assert_eq!(planned_finish(&task()), NaiveDate::from_ymd_opt(2024, 2, 28));
    }

    #[test]
    fn missing_dates_render_empty() {
        assert_eq!(date(None), "");
        assert_eq!(date(NaiveDate::from_ymd_opt(2024, 3, 29)), "2024-03-29");
        assert_eq!(dash_date(None), "-");
    }
}
