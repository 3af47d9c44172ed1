//! `px hours`: hours booked on a project.

use crate::cmd::ProjectSelector;
use crate::output::{OutputMode, pretty_kv, pretty_rule, render_mode};
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use projex_core::db::SqliteFetcher;
use projex_core::db::projects;
use projex_core::model::Timesheet;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct HoursArgs {
    #[command(flatten)]
    pub project: ProjectSelector,
}

#[derive(Debug, Serialize)]
pub struct HoursReport {
    pub entries: Vec<Timesheet>,
    pub total_amount: f64,
    /// Amount times internal rate, plus expenses.
    pub total_cost: f64,
}

impl HoursReport {
    fn new(entries: Vec<Timesheet>) -> Self {
        let total_amount = entries.iter().map(|e| e.amount).sum();
        let total_cost = entries
            .iter()
            .map(|e| e.amount.mul_add(e.rate_internal, e.expense.unwrap_or_default()))
            .sum();
        Self {
            entries,
            total_amount,
            total_cost,
        }
    }
}

/// Execute `px hours`.
///
/// # Errors
///
/// Returns an error if the database is unavailable or the query fails.
pub fn run_hours(args: &HoursArgs, session: &Session, output: OutputMode) -> Result<()> {
    let conn = session.connect()?;
    let fetcher = SqliteFetcher::new(&conn);

    let entries = projects::get_work_hours(&session.filters, &fetcher, &args.project.project_ref())?;
    let report = HoursReport::new(entries);

    render_mode(
        output,
        &report,
        |report, w| {
            for e in &report.entries {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{:.2}",
                    e.date_start.format("%Y-%m-%d %H:%M"),
                    e.resource_display_name(),
                    e.worktype_name,
                    e.amount
                )?;
            }
            Ok(())
        },
        |report, w| {
            writeln!(w, "{:<17} {:<22} {:<14} {:>7}", "START", "RESOURCE", "WORK", "HOURS")?;
            pretty_rule(w)?;
            for e in &report.entries {
                writeln!(
                    w,
                    "{:<17} {:<22} {:<14} {:>7.2}",
                    e.date_start.format("%Y-%m-%d %H:%M").to_string(),
                    e.resource_display_name(),
                    e.worktype_code.as_deref().unwrap_or(&e.worktype_name),
                    e.amount
                )?;
            }
            pretty_rule(w)?;
            pretty_kv(w, "Hours", format!("{:.2}", report.total_amount))?;
            pretty_kv(w, "Cost", format!("{:.2}", report.total_cost))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(amount: f64, rate: f64, expense: Option<f64>) -> Timesheet {
        let day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        Timesheet {
            project_id: Some("2".into()),
            resource_id: "1".into(),
            resource_first_name: Some("Anna".into()),
            resource_name: "Jansen".into(),
            worktype_id: "1".into(),
            worktype_code: Some("ENG".into()),
            worktype_name: "Engineering".into(),
            date_start: day.and_hms_opt(8, 0, 0).unwrap(),
            date_end: day.and_hms_opt(16, 30, 0).unwrap(),
            amount,
            rate_internal: rate,
            expense,
        }
    }

    #[test]
    fn totals_include_expenses() {
        let report = HoursReport::new(vec![entry(8.0, 65.0, None), entry(2.5, 40.0, Some(30.0))]);
        assert!((report.total_amount - 10.5).abs() < f64::EPSILON);
        assert!((report.total_cost - 650.0).abs() < 1e-9);
    }
}
