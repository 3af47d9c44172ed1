//! Typed reads: build SQL through the filter pipeline, stream rows through
//! a [`RecordFetcher`], map them with [`FromRow`].

use tracing::debug;

use super::query::{PlanningQuery, ProjectQuery, ProjectRef};
use super::{FetchError, RecordFetcher};
use crate::hooks::{FilterPipeline, HookError, names};
use crate::model::{
    AttachedDocument, FromRow, MappingError, PlanningTask, ProjectRecord, Timesheet,
};

/// Errors raised while reading records.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("project {0} not found")]
    NotFound(String),
}

/// Stream projects matching `query` to `on_row`. Returns the row count.
///
/// # Errors
///
/// Hook, fetch and mapping errors, or whatever `on_row` returns.
pub fn get_projects<F, R>(
    filters: &FilterPipeline,
    fetcher: &F,
    query: &ProjectQuery,
    mut on_row: R,
) -> Result<usize, QueryError>
where
    F: RecordFetcher,
    R: FnMut(ProjectRecord) -> Result<(), QueryError>,
{
    let sql = filters.apply_filters(names::SQL_GET_PROJECTS, String::new(), query)?;
    debug!(hook = names::SQL_GET_PROJECTS.name(), %sql, "running project query");
    fetcher.execute(&sql, |row| on_row(ProjectRecord::from_row(&row)?))
}

/// Fetch a single project. When several rows match, the last one wins.
///
/// # Errors
///
/// [`QueryError::NotFound`] when nothing matches, otherwise as
/// [`get_projects`].
pub fn get_project<F: RecordFetcher>(
    filters: &FilterPipeline,
    fetcher: &F,
    project: &ProjectRef,
) -> Result<ProjectRecord, QueryError> {
    let mut found = None;
    get_projects(filters, fetcher, &ProjectQuery::single(project), |record| {
        found = Some(record);
        Ok(())
    })?;
    found.ok_or_else(|| QueryError::NotFound(project.to_string()))
}

/// Stream the project numbered `number` together with every project whose
/// install number points at it, in ascending order.
///
/// # Errors
///
/// As [`get_projects`].
pub fn get_project_and_children<F, R>(
    filters: &FilterPipeline,
    fetcher: &F,
    number: &str,
    on_row: R,
) -> Result<usize, QueryError>
where
    F: RecordFetcher,
    R: FnMut(ProjectRecord) -> Result<(), QueryError>,
{
    get_projects(filters, fetcher, &ProjectQuery::children_of(number), on_row)
}

/// Planning tasks for `query`.
///
/// # Errors
///
/// Hook, fetch and mapping errors.
pub fn get_planning_tasks<F: RecordFetcher>(
    filters: &FilterPipeline,
    fetcher: &F,
    query: &PlanningQuery,
) -> Result<Vec<PlanningTask>, QueryError> {
    let sql = filters.apply_filters(names::SQL_GET_PLANNING, String::new(), query)?;
    collect(fetcher, &sql)
}

/// Documents attached to `project`.
///
/// # Errors
///
/// Hook, fetch and mapping errors.
pub fn get_attached_documents<F: RecordFetcher>(
    filters: &FilterPipeline,
    fetcher: &F,
    project: &ProjectRef,
) -> Result<Vec<AttachedDocument>, QueryError> {
    let sql = filters.apply_filters(names::SQL_GET_ATTACHED_DOCUMENTS, String::new(), project)?;
    collect(fetcher, &sql)
}

/// Hours booked on `project`.
///
/// # Errors
///
/// Hook, fetch and mapping errors.
pub fn get_work_hours<F: RecordFetcher>(
    filters: &FilterPipeline,
    fetcher: &F,
    project: &ProjectRef,
) -> Result<Vec<Timesheet>, QueryError> {
    let sql = filters.apply_filters(names::SQL_GET_WORK_HOURS, String::new(), project)?;
    collect(fetcher, &sql)
}

fn collect<F: RecordFetcher, T: FromRow>(fetcher: &F, sql: &str) -> Result<Vec<T>, QueryError> {
    let mut out = Vec::new();
    fetcher.execute(sql, |row| {
        out.push(T::from_row(&row)?);
        Ok::<(), QueryError>(())
    })?;
    Ok(out)
}
