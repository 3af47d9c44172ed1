//! Drill-down records shown for a single project.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::row::{FromRow, MappingError, Row, RowReader};

/// A planning task. Top-level tasks have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanningTask {
    pub task_id: String,
    pub parent_id: Option<String>,
    pub project_id: Option<String>,
    pub project_number: String,
    pub task_description: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_start_actual: Option<NaiveDate>,
    pub date_finish: Option<NaiveDate>,
    pub date_finish_actual: Option<NaiveDate>,
    pub date_delivery: Option<NaiveDate>,
}

impl FromRow for PlanningTask {
    fn from_row(row: &Row) -> Result<Self, MappingError> {
        let r = RowReader::new(row);
        Ok(Self {
            task_id: r.id("task_id")?,
            parent_id: r.opt_id("parent_id")?,
            project_id: r.opt_id("project_id")?,
            project_number: r.text("project_number")?,
            task_description: r.opt_text("task_description")?,
            date_start: r.opt_date("date_start")?,
            date_start_actual: r.opt_date("date_start_actual")?,
            date_finish: r.opt_date("date_finish")?,
            date_finish_actual: r.opt_date("date_finish_actual")?,
            date_delivery: r.opt_date("date_delivery")?,
        })
    }
}

/// A document attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedDocument {
    pub project_id: Option<String>,
    pub title: String,
    pub version: i64,
    pub is_hidden: bool,
    pub path: String,
    pub size: Option<i64>,
    pub date_created: Option<NaiveDateTime>,
    pub date_modified: Option<NaiveDateTime>,
}

impl FromRow for AttachedDocument {
    fn from_row(row: &Row) -> Result<Self, MappingError> {
        let r = RowReader::new(row);
        Ok(Self {
            project_id: r.opt_id("project_id")?,
            title: r.text("title")?,
            version: r.opt_i64("version")?.unwrap_or(1),
            is_hidden: r.flag("is_hidden")?,
            path: r.text("path")?,
            size: r.opt_i64("size")?,
            date_created: r.opt_datetime("date_created")?,
            date_modified: r.opt_datetime("date_modified")?,
        })
    }
}

/// Hours one resource booked on a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timesheet {
    pub project_id: Option<String>,
    pub resource_id: String,
    pub resource_first_name: Option<String>,
    pub resource_name: String,
    pub worktype_id: String,
    pub worktype_code: Option<String>,
    pub worktype_name: String,
    pub date_start: NaiveDateTime,
    pub date_end: NaiveDateTime,
    pub amount: f64,
    pub rate_internal: f64,
    pub expense: Option<f64>,
}

impl Timesheet {
    /// Display name: first name and surname when both are known.
    #[must_use]
    pub fn resource_display_name(&self) -> String {
        match self.resource_first_name.as_deref().map(str::trim) {
            Some(first) if !first.is_empty() => format!("{first} {}", self.resource_name),
            _ => self.resource_name.clone(),
        }
    }
}

impl FromRow for Timesheet {
    fn from_row(row: &Row) -> Result<Self, MappingError> {
        let r = RowReader::new(row);
        Ok(Self {
            project_id: r.opt_id("project_id")?,
            resource_id: r.id("resource_id")?,
            resource_first_name: r.opt_text("resource_first_name")?,
            resource_name: r.text("resource_name")?,
            worktype_id: r.id("worktype_id")?,
            worktype_code: r.opt_id("worktype_code")?,
            worktype_name: r.text("worktype_name")?,
            date_start: r.datetime("date_start")?,
            date_end: r.datetime("date_end")?,
            amount: r.f64("amount")?,
            rate_internal: r.opt_f64("rate_internal")?.unwrap_or_default(),
            expense: r.opt_f64("expense")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    fn row(columns: Vec<(&str, Value)>) -> Row {
        columns
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn document_defaults_version_and_hidden_flag() {
        let doc = AttachedDocument::from_row(&row(vec![
            ("title", Value::Text("Quote".into())),
            ("path", Value::Text("/docs/quote.pdf".into())),
        ]))
        .unwrap();
        assert_eq!(doc.version, 1);
        assert!(!doc.is_hidden);
        assert_eq!(doc.size, None);
    }

    #[test]
    fn timesheet_requires_amount() {
        let err = Timesheet::from_row(&row(vec![
            ("resource_id", Value::Integer(1)),
            ("resource_name", Value::Text("Jansen".into())),
            ("worktype_id", Value::Integer(2)),
            ("worktype_name", Value::Text("Assembly".into())),
            ("date_start", Value::Text("2024-03-01 08:00:00".into())),
            ("date_end", Value::Text("2024-03-01 12:00:00".into())),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingColumn {
                column: "amount".to_string()
            }
        );
    }

    #[test]
    fn timesheet_display_name_joins_first_name() {
        let sheet = Timesheet::from_row(&row(vec![
            ("resource_id", Value::Integer(1)),
            ("resource_first_name", Value::Text("Anna".into())),
            ("resource_name", Value::Text("Jansen".into())),
            ("worktype_id", Value::Integer(2)),
            ("worktype_name", Value::Text("Assembly".into())),
            ("date_start", Value::Text("2024-03-01 08:00:00".into())),
            ("date_end", Value::Text("2024-03-01 12:00:00".into())),
            ("amount", Value::Real(4.0)),
        ]))
        .unwrap();
        assert_eq!(sheet.resource_display_name(), "Anna Jansen");
        assert_eq!(sheet.rate_internal, 0.0);
    }

    #[test]
    fn planning_task_reads_optional_dates() {
        let task = PlanningTask::from_row(&row(vec![
            ("task_id", Value::Integer(11)),
            ("project_number", Value::Text("P-1".into())),
            ("date_delivery", Value::Text("2024-05-31".into())),
        ]))
        .unwrap();
        assert_eq!(task.task_id, "11");
        assert_eq!(task.parent_id, None);
        assert_eq!(task.date_delivery, NaiveDate::from_ymd_opt(2024, 5, 31));
    }
}
